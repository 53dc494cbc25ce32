use popbars::loader::{self, LoadOptions, Source};
use popbars::models::{Cell, RawRow};
use popbars::view::{categories, group_by_year, year_label_at, year_labels};
use popbars::{ViewModel, WrapRule};

fn row(name: &str, year: Cell, value: f64) -> RawRow {
    RawRow::new(Cell::Text(name.into()), year, Cell::Number(value))
}

fn header() -> RawRow {
    RawRow::new(
        Cell::Text("Country name".into()),
        Cell::Text("Year".into()),
        Cell::Text("Population".into()),
    )
}

#[test]
fn groups_keep_first_seen_year_order_and_row_order() {
    let rows = vec![
        row("B", Cell::Number(1951.0), 2.0),
        row("A", Cell::Number(1950.0), 1.0),
        row("C", Cell::Number(1951.0), 3.0),
        row("D", Cell::Number(1950.0), 4.0),
    ];
    let groups = group_by_year(&rows);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].year, Cell::Number(1951.0));
    assert_eq!(groups[1].year, Cell::Number(1950.0));
    let names: Vec<String> = groups[0].rows.iter().map(|r| r.name.to_string()).collect();
    assert_eq!(names, vec!["B", "C"]);
}

#[test]
fn grouping_is_idempotent() {
    let rows = vec![
        row("A", Cell::Number(2000.0), 1.0),
        row("B", Cell::Number(2001.0), 2.0),
        row("C", Cell::Number(2000.0), 3.0),
    ];
    assert_eq!(group_by_year(&rows), group_by_year(&rows));
}

#[test]
fn year_keys_compare_with_their_type() {
    let rows = vec![
        row("A", Cell::Number(1950.0), 1.0),
        row("B", Cell::Text("1950".into()), 2.0),
    ];
    let groups = group_by_year(&rows);
    assert_eq!(groups.len(), 2);
    // both print the same way
    assert_eq!(year_labels(&groups), vec!["1950", "1950"]);
}

#[test]
fn header_token_is_filtered_from_labels_but_still_grouped() {
    let rows = vec![
        header(),
        row("A", Cell::Number(1950.0), 1.0),
        row("A", Cell::Number(1951.0), 2.0),
    ];
    let groups = group_by_year(&rows);
    assert_eq!(groups.len(), 3);
    assert_eq!(year_labels(&groups), vec!["1950", "1951"]);
    // header group goes last so labels and groups share an index
    assert_eq!(groups[0].year, Cell::Number(1950.0));
    assert_eq!(groups[2].year, Cell::Text("Year".into()));
    assert_eq!(categories(&groups), vec!["A"]);
}

#[test]
fn missing_label_displays_zero() {
    let labels = vec!["1950".to_string()];
    assert_eq!(year_label_at(&labels, 0), "1950");
    assert_eq!(year_label_at(&labels, 1), "0");
}

#[test]
fn categories_come_from_the_first_group_only() {
    let rows = vec![
        row("Small", Cell::Number(1950.0), 1.0),
        row("Big", Cell::Number(1950.0), 9.0),
        row("Other", Cell::Number(1951.0), 100.0),
        row("Big", Cell::Number(1951.0), 5.0),
    ];
    let groups = group_by_year(&rows);
    assert_eq!(categories(&groups), vec!["Big", "Small"]);
}

#[test]
fn empty_input_has_no_groups_or_labels() {
    let groups = group_by_year(&[]);
    assert!(groups.is_empty());
    assert!(year_labels(&groups).is_empty());
    assert!(categories(&groups).is_empty());
}

#[test]
fn bundled_data_with_header_lines_up_labels_and_bars() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/data.csv");
    let rows = loader::load_or_empty(&Source::parse(path), &LoadOptions::default());
    assert_eq!(rows[0].year, Cell::Text("Year".into()));

    let mut vm = ViewModel::with_rows(rows, WrapRule::AfterCount, "en");
    let first = vm.frame();
    assert_eq!(first.year_label, "1950");
    assert_eq!(first.categories[0], "China");
    assert_eq!(first.bars[0].label, "China");
    assert_eq!(first.bars[0].value, 543_979_200.0);
    assert_eq!(first.bars.len(), 12);

    vm.tick();
    let second = vm.frame();
    assert_eq!(second.year_label, "1951");
    assert_eq!(second.bars[0].value, 554_314_804.0);
    assert_eq!(second.categories, first.categories);
}
