use crate::models::{Frame, YearGroup};
use crate::view::{series_for_index, year_labels};
use anyhow::Result;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Tidy export row: one bar of one year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedValue {
    pub year: String,
    pub rank: usize,
    pub name: String,
    pub value: Option<f64>,
}

/// Top bars of every year group, ranked from 1.
///
/// The header group (year `Year`) is skipped.
pub fn ranked_values(groups: &[YearGroup]) -> Vec<RankedValue> {
    let labels = year_labels(groups);
    groups
        .iter()
        .enumerate()
        .filter(|(_, g)| labels.contains(&g.year.to_string()))
        .flat_map(|(i, g)| {
            let year = g.year.to_string();
            series_for_index(groups, i)
                .into_iter()
                .enumerate()
                .map(move |(rank, bar)| RankedValue {
                    year: year.clone(),
                    rank: rank + 1,
                    name: bar.label,
                    value: bar.value.is_finite().then_some(bar.value),
                })
        })
        .collect()
}

/// Save ranked values as CSV with header.
pub fn save_csv<P: AsRef<Path>>(values: &[RankedValue], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("year", "rank", "name", "value"))?;
    for v in values {
        wtr.serialize((&v.year, v.rank, &v.name, v.value))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save ranked values as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(values: &[RankedValue], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(values)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save one frame as pretty JSON (what a renderer would consume).
pub fn save_frame_json<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(frame)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, RawRow};
    use crate::view::group_by_year;
    use tempfile::tempdir;

    fn row(name: &str, year: f64, value: f64) -> RawRow {
        RawRow::new(Cell::Text(name.into()), Cell::Number(year), Cell::Number(value))
    }

    #[test]
    fn ranked_values_skip_header_and_rank_from_one() {
        let rows = vec![
            RawRow::new(
                Cell::Text("Country".into()),
                Cell::Text("Year".into()),
                Cell::Text("Population".into()),
            ),
            row("A", 2000.0, 1.0),
            row("B", 2000.0, 3.0),
        ];
        let values = ranked_values(&group_by_year(&rows));
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].name, "B");
        assert_eq!(values[0].rank, 1);
        assert_eq!(values[1].year, "2000");
    }

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let values = ranked_values(&group_by_year(&[row("India", 1950.0, 357.0)]));
        save_csv(&values, &csvp).unwrap();
        save_json(&values, &jsonp).unwrap();
        let text = std::fs::read_to_string(&csvp).unwrap();
        assert!(text.starts_with("year,rank,name,value"));
        assert!(text.contains("1950,1,India,357"));
        assert!(jsonp.exists());
    }
}
