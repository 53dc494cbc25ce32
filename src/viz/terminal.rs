//! Plain-text rendering of a frame for terminals.

use super::text::truncate_chars;
use super::types::ChartOptions;
use super::util::format_grouped;
use crate::models::Frame;
use std::fmt::Write;

const LABEL_COLS: usize = 18;
const BAR_CHAR: char = '█';

/// Render `frame` as text, `width` columns wide for the bar area.
///
/// Rows pair the fixed categories with the current bars by rank, exactly as
/// the graphical chart does.
pub fn text_chart(frame: &Frame, opts: &ChartOptions, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", opts.title);
    let _ = writeln!(out, "{} in {}", opts.series_name, frame.year_label);

    let max = frame
        .bars
        .iter()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    let rows = frame.bars.len().max(frame.categories.len());
    for rank in 0..rows {
        let label = frame
            .categories
            .get(rank)
            .map(|s| truncate_chars(s, LABEL_COLS))
            .unwrap_or_default();
        let (len, value_text) = match frame.bars.get(rank) {
            Some(bar) => {
                let len = if max > 0.0 && bar.value.is_finite() && bar.value > 0.0 {
                    ((bar.value / max) * width as f64).round() as usize
                } else {
                    0
                };
                (len, format_grouped(bar.value, &opts.locale))
            }
            None => (0, String::new()),
        };
        let bar: String = std::iter::repeat_n(BAR_CHAR, len).collect();
        let _ = writeln!(out, "{label:>LABEL_COLS$} | {bar} {value_text}");
    }

    let _ = writeln!(out, "Total: {}", frame.total_text);
    out
}
