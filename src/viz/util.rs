//! Utility functions for visualization: colours, number formatting, locale mapping.

use super::types::Rgb8;
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

#[inline]
pub fn rgb_color(c: Rgb8) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Grouped number with up to three fraction digits, e.g. `1,234,567.5`.
/// Non-finite values print as `NaN`; magnitudes above 1e15 drop the fraction.
pub fn format_grouped(v: f64, locale_tag: &str) -> String {
    if !v.is_finite() {
        return "NaN".to_string();
    }
    let (locale, dec_sep) = map_locale(locale_tag);
    if v.abs() > 1e15 {
        // `as` saturates at the i64 bounds
        return (v.round() as i64).to_formatted_string(locale);
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    let int_part = rounded.trunc();
    let mut out = (int_part.abs() as i64).to_formatted_string(locale);
    if rounded < 0.0 && rounded != 0.0 {
        out.insert(0, '-');
    }
    let frac = format!("{:.3}", (rounded - int_part).abs());
    // "0.500" -> "5"
    let digits = frac
        .trim_start_matches('0')
        .trim_start_matches('.')
        .trim_end_matches('0');
    if !digits.is_empty() {
        out.push(dec_sep);
        out.push_str(digits);
    }
    out
}

/// Upper bound of the value axis: the largest finite bar plus headroom for
/// the value labels. Never below 1.
pub fn value_axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    (max * 1.15).max(1.0)
}
