use crate::models::YearGroup;
use serde::{Deserialize, Serialize};

/// Summary statistics for one year group (all rows, not only the top bars).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearSummary {
    pub year: String,
    pub count: usize,
    /// Rows whose value is not numeric.
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute statistics per year group, in group order.
pub fn year_summaries(groups: &[YearGroup]) -> Vec<YearSummary> {
    groups
        .iter()
        .map(|g| {
            let mut vals: Vec<f64> = g
                .rows
                .iter()
                .map(|r| r.value.as_number())
                .filter(|v| !v.is_nan())
                .collect();
            vals.sort_by(|a, b| a.total_cmp(b));
            let count = vals.len();
            let min = vals.first().cloned();
            let max = vals.last().cloned();
            let mean = if count > 0 {
                Some(vals.iter().copied().sum::<f64>() / count as f64)
            } else {
                None
            };
            let median = if count == 0 {
                None
            } else if count % 2 == 1 {
                Some(vals[count / 2])
            } else {
                Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
            };
            YearSummary {
                year: g.year.to_string(),
                count,
                missing: g.rows.len() - count,
                min,
                max,
                mean,
                median,
            }
        })
        .collect()
}
