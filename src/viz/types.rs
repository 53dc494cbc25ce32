//! Public types and constants for the visualization module.

use crate::animation::{DEFAULT_INTERVAL, WrapRule};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bar palette, one colour per rank.
pub const DEFAULT_PALETTE: [&str; 12] = [
    "#33b2df", "#546E7A", "#d4526e", "#13d8aa", "#A5978B", "#2b908f", "#f9a3a4", "#90ee7e",
    "#f48024", "#69d2e7", "#40d237", "#62e721",
];

pub const DEFAULT_TITLE: &str = "Population growth per country, 1950 to 2021";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Parse `#RRGGBB` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let h = hex.trim().trim_start_matches('#');
        if h.len() != 6 || !h.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
        Some(Rgb8 {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
        })
    }
}

/// Chart configuration shared by the file renderer, the terminal view and the GUI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub title: String,
    pub subtitle: String,
    /// Name of the single data series.
    pub series_name: String,
    /// `#RRGGBB` colours, cycled by bar rank.
    pub palette: Vec<String>,
    /// Number-format locale tag (`en`, `de`, `fr`, ...).
    pub locale: String,
    pub width: u32,
    pub height: u32,
    /// Fraction of each row taken by its bar.
    pub bar_height: f64,
    pub wrap: WrapRule,
    pub interval_ms: u64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: "Click on the legend below to filter by continent".to_string(),
            series_name: "Population".to_string(),
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            locale: "en".to_string(),
            width: 1000,
            height: 600,
            bar_height: 0.9,
            wrap: WrapRule::default(),
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

impl ChartOptions {
    /// Read options from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Colour for the bar at `rank`. Unparseable entries fall back to grey.
    pub fn color(&self, rank: usize) -> Rgb8 {
        if self.palette.is_empty() {
            return Rgb8 { r: 128, g: 128, b: 128 };
        }
        Rgb8::from_hex(&self.palette[rank % self.palette.len()]).unwrap_or(Rgb8 {
            r: 128,
            g: 128,
            b: 128,
        })
    }
}
