//! Text measurement and truncation helpers for category labels.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) > max_px {
            out.pop();
            if out.is_empty() {
                return out;
            }
            while !out.is_empty() && estimate_text_width_px(&format!("{out}…"), font_px) > max_px {
                out.pop();
            }
            out.push('…');
            return out;
        }
    }
    out
}

/// Truncate to `max_cols` characters (terminal cells), ellipsis included.
pub fn truncate_chars(text: &str, max_cols: usize) -> String {
    if text.chars().count() <= max_cols {
        return text.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_cols - 1).collect();
    out.push('…');
    out
}

/// Width of the label column: the widest label, capped at `max_px` and padded
/// for tick marks.
pub fn label_area_px(labels: &[String], font_px: u32, max_px: u32) -> u32 {
    let widest = labels
        .iter()
        .map(|l| estimate_text_width_px(l, font_px))
        .max()
        .unwrap_or(0);
    widest.min(max_px).saturating_add(18).clamp(48, max_px + 18)
}
