use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One spreadsheet cell as it came out of the decoder.
///
/// No schema is applied: a "year" may be a number or a string, a "value" may
/// be `2.5B`. Coercion happens only when a number is actually needed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    /// Build a cell from a CSV field: finite numbers become `Number`,
    /// blank fields `Empty`, everything else stays text.
    pub fn from_field(field: &str) -> Self {
        let t = field.trim();
        if t.is_empty() {
            return Cell::Empty;
        }
        match t.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(field.to_string()),
        }
    }

    /// Numeric view used for ordering and bar lengths. Non-numeric cells are `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            Cell::Empty => f64::NAN,
        }
    }

    /// Integer view used for totals: numbers truncate toward zero, text yields
    /// its leading integer prefix (`"2.5B"` -> 2), anything else `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(v.trunc() as i64),
            Cell::Number(_) => None,
            Cell::Text(s) => leading_integer(s),
            Cell::Empty => None,
        }
    }

    pub fn is_text(&self, literal: &str) -> bool {
        matches!(self, Cell::Text(s) if s == literal)
    }
}

/// Parse an optional sign followed by decimal digits at the start of `s`
/// (after leading whitespace). Trailing garbage is ignored; digit runs too
/// long for `i64` saturate.
fn leading_integer(s: &str) -> Option<i64> {
    let t = s.trim_start();
    let (neg, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let n = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if neg { n.saturating_neg() } else { n })
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

/// Cells compare with their type: `Number(1950.0)` and `Text("1950")` differ.
/// Numbers compare by bit pattern so that `Cell` can key a hash map.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Empty, Cell::Empty) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Number(v) => v.to_bits().hash(state),
            Cell::Text(s) => s.hash(state),
            Cell::Empty => {}
        }
    }
}

/// Positional `(name, year, value)` triple taken straight from sheet cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawRow {
    pub name: Cell,
    pub year: Cell,
    pub value: Cell,
}

impl RawRow {
    pub fn new(name: Cell, year: Cell, value: Cell) -> Self {
        Self { name, year, value }
    }

    /// Take the first three cells of a decoded row; missing cells are `Empty`.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let mut it = cells.into_iter();
        Self {
            name: it.next().unwrap_or_default(),
            year: it.next().unwrap_or_default(),
            value: it.next().unwrap_or_default(),
        }
    }
}

/// All rows sharing one year value, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearGroup {
    pub year: Cell,
    pub rows: Vec<RawRow>,
}

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Integer coercion used by the total; `None` contributes 0.
    pub integer: Option<i64>,
}

/// Everything a renderer needs to draw one animation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    pub year_label: String,
    /// Axis categories, fixed to the first group's leaders.
    pub categories: Vec<String>,
    pub bars: Vec<Bar>,
    pub total: i64,
    pub total_text: String,
}
