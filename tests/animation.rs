use popbars::models::{Cell, RawRow};
use popbars::{Ticker, ViewModel, WrapRule, YearCursor};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

fn years(n: usize) -> Vec<RawRow> {
    (0..n)
        .map(|i| {
            RawRow::new(
                Cell::Text("World".into()),
                Cell::Number(1950.0 + i as f64),
                Cell::Number(1000.0 + i as f64),
            )
        })
        .collect()
}

#[test]
fn after_count_rule_walks_past_the_last_year_before_wrapping() {
    let mut cursor = YearCursor::new(WrapRule::AfterCount);
    let count = 3;
    let visited: Vec<usize> = (0..6).map(|_| cursor.advance(count)).collect();
    // 0 -> 1 -> 2 -> 3 -> 4 -> 0 -> 1
    assert_eq!(visited, vec![1, 2, 3, 4, 0, 1]);
    assert_eq!(cursor.cycle_len(count), count + 2);
}

#[test]
fn after_count_rule_is_not_back_at_zero_after_count_plus_one_ticks() {
    let count = 5;
    let mut cursor = YearCursor::new(WrapRule::AfterCount);
    for _ in 0..count + 1 {
        cursor.advance(count);
    }
    assert_eq!(cursor.index(), count + 1);
    cursor.advance(count);
    assert_eq!(cursor.index(), 0);
}

#[test]
fn at_count_rule_wraps_right_after_the_last_year() {
    let count = 3;
    let mut cursor = YearCursor::new(WrapRule::AtCount);
    let visited: Vec<usize> = (0..4).map(|_| cursor.advance(count)).collect();
    assert_eq!(visited, vec![1, 2, 0, 1]);
    assert_eq!(cursor.cycle_len(count), count);
}

#[test]
fn wrap_with_no_years_stays_bounded() {
    let mut after = YearCursor::new(WrapRule::AfterCount);
    assert_eq!(after.advance(0), 1);
    assert_eq!(after.advance(0), 0);

    let mut at = YearCursor::new(WrapRule::AtCount);
    assert_eq!(at.advance(0), 0);
}

#[test]
fn one_tick_moves_the_display_to_the_next_year() {
    let rows = vec![
        RawRow::new(
            Cell::Text("World".into()),
            Cell::Text("1950".into()),
            Cell::Text("2.5B".into()),
        ),
        RawRow::new(
            Cell::Text("World".into()),
            Cell::Text("1951".into()),
            Cell::Text("2.55B".into()),
        ),
    ];
    let mut vm = ViewModel::with_rows(rows, WrapRule::AfterCount, "en");
    assert_eq!(vm.frame().year_label, "1950");
    assert_eq!(vm.frame().bars.len(), 1);
    vm.tick();
    assert_eq!(vm.index(), 1);
    assert_eq!(vm.frame().year_label, "1951");
}

#[test]
fn view_model_cycle_includes_two_empty_frames_by_default() {
    let mut vm = ViewModel::with_rows(years(3), WrapRule::AfterCount, "en");
    assert_eq!(vm.cycle_len(), 5);
    let mut empty = 0;
    for _ in 0..vm.cycle_len() {
        if vm.frame().bars.is_empty() {
            empty += 1;
            assert_eq!(vm.frame().total_text, "0");
        }
        vm.tick();
    }
    assert_eq!(empty, 2);
    assert_eq!(vm.index(), 0);
}

#[test]
fn view_model_caches_frames_until_rows_change() {
    let mut vm = ViewModel::with_rows(years(2), WrapRule::AtCount, "en");
    let g1 = vm.groups();
    let g2 = vm.groups();
    assert!(Arc::ptr_eq(&g1, &g2));

    let before = vm.generation();
    vm.set_rows(years(4));
    assert_eq!(vm.generation(), before + 1);
    let g3 = vm.groups();
    assert!(!Arc::ptr_eq(&g1, &g3));
    assert_eq!(vm.year_count(), 4);
}

#[test]
fn empty_view_model_renders_empty() {
    let mut vm = ViewModel::default();
    let frame = vm.frame();
    assert!(vm.year_labels().is_empty());
    assert!(frame.bars.is_empty());
    assert_eq!(frame.total_text, "0");
}

#[test]
fn ticker_fires_repeatedly_and_stops_on_drop() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let ticker = Ticker::spawn(Duration::from_millis(10), move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    thread::sleep(Duration::from_millis(120));
    assert!(ticker.is_running());
    drop(ticker);

    let after_drop = count.load(Ordering::SeqCst);
    assert!(after_drop >= 2, "expected several ticks, got {after_drop}");
    thread::sleep(Duration::from_millis(60));
    assert_eq!(count.load(Ordering::SeqCst), after_drop);
}

#[test]
fn ticker_stop_is_idempotent() {
    let (mut ticker, ticks) = Ticker::channel(Duration::from_millis(5));
    ticks
        .recv_timeout(Duration::from_secs(2))
        .expect("first tick");
    ticker.stop();
    ticker.stop();
    assert!(!ticker.is_running());
}
