//! View model: reshape raw rows into per-year groups and derive what the chart
//! shows for one year index.
//!
//! The free functions are pure. [`ViewModel`] is the state container used by
//! the viewers: it owns the rows and the animation cursor and memoizes the
//! grouping (per rows generation) and the current frame (per generation and
//! index).

use crate::animation::{WrapRule, YearCursor};
use crate::loader::HEADER_YEAR_TOKEN;
use crate::models::{Bar, Frame, RawRow, YearGroup};
use log::debug;
use num_format::ToFormattedString;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::viz::map_locale;

/// Bars shown per year.
pub const TOP_N: usize = 12;

/// Partition rows by year, keeping years in first-seen order and rows in
/// source order.
///
/// A header group (year `Year`) is moved behind the year groups, so that
/// `groups[i]` is the group labelled `year_labels(..)[i]`.
pub fn group_by_year(rows: &[RawRow]) -> Vec<YearGroup> {
    let mut slot_by_year = HashMap::new();
    let mut groups: Vec<YearGroup> = Vec::new();
    for row in rows {
        let slot = *slot_by_year.entry(&row.year).or_insert_with(|| {
            groups.push(YearGroup {
                year: row.year.clone(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row.clone());
    }
    // stable: year groups keep their order
    groups.sort_by_key(is_header_group);
    groups
}

fn is_header_group(group: &YearGroup) -> bool {
    group.year.to_string() == HEADER_YEAR_TOKEN
}

/// Stringified group years with the header token removed.
pub fn year_labels(groups: &[YearGroup]) -> Vec<String> {
    groups
        .iter()
        .filter(|g| !is_header_group(g))
        .map(|g| g.year.to_string())
        .collect()
}

/// Label shown for `index`, `"0"` when there is none.
pub fn year_label_at(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| "0".to_string())
}

/// Descending by numeric value; non-numeric values go last, ties keep source order.
fn by_value_desc(a: &RawRow, b: &RawRow) -> Ordering {
    let (x, y) = (a.value.as_number(), b.value.as_number());
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
    }
}

fn top_rows(group: &YearGroup) -> Vec<&RawRow> {
    let mut rows: Vec<&RawRow> = group.rows.iter().collect();
    rows.sort_by(|a, b| by_value_desc(a, b));
    rows.truncate(TOP_N);
    rows
}

/// Top bars of `groups[index]`; empty when the index is out of range.
pub fn series_for_index(groups: &[YearGroup], index: usize) -> Vec<Bar> {
    let Some(group) = groups.get(index) else {
        return Vec::new();
    };
    top_rows(group)
        .into_iter()
        .map(|r| Bar {
            label: r.name.to_string(),
            value: r.value.as_number(),
            integer: r.value.as_integer(),
        })
        .collect()
}

/// Axis categories: the leaders of the *first* group. They stay fixed while
/// the index advances.
pub fn categories(groups: &[YearGroup]) -> Vec<String> {
    groups
        .first()
        .map(|g| top_rows(g).into_iter().map(|r| r.name.to_string()).collect())
        .unwrap_or_default()
}

/// Sum of the integer coercions of the bars; non-numeric values count as 0.
pub fn total(bars: &[Bar]) -> i64 {
    bars.iter()
        .map(|b| b.integer.unwrap_or(0))
        .fold(0i64, i64::saturating_add)
}

/// Format a total with the locale's grouping separator.
pub fn format_total(total: i64, locale_tag: &str) -> String {
    let (locale, _) = map_locale(locale_tag);
    total.to_formatted_string(locale)
}

/// Build the frame for `index` from already grouped rows.
pub fn build_frame(groups: &[YearGroup], index: usize, locale_tag: &str) -> Frame {
    let labels = year_labels(groups);
    let bars = series_for_index(groups, index);
    let total = total(&bars);
    Frame {
        index,
        year_label: year_label_at(&labels, index),
        categories: categories(groups),
        bars,
        total,
        total_text: format_total(total, locale_tag),
    }
}

#[derive(Debug, Default)]
struct Cache {
    groups: Option<(u64, Arc<[YearGroup]>)>,
    year_count: Option<(u64, usize)>,
    frame: Option<((u64, usize), Frame)>,
}

/// Rows + year cursor, with derived values cached.
#[derive(Debug)]
pub struct ViewModel {
    rows: Arc<[RawRow]>,
    generation: u64,
    cursor: YearCursor,
    locale: String,
    cache: Cache,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new(WrapRule::default(), "en")
    }
}

impl ViewModel {
    pub fn new(rule: WrapRule, locale_tag: &str) -> Self {
        Self {
            rows: Arc::from(Vec::new()),
            generation: 0,
            cursor: YearCursor::new(rule),
            locale: locale_tag.to_string(),
            cache: Cache::default(),
        }
    }

    pub fn with_rows(rows: Vec<RawRow>, rule: WrapRule, locale_tag: &str) -> Self {
        let mut vm = Self::new(rule, locale_tag);
        vm.set_rows(rows);
        vm
    }

    /// Publish a new row set. Invalidates every cached value.
    pub fn set_rows(&mut self, rows: Vec<RawRow>) {
        self.rows = Arc::from(rows);
        self.generation += 1;
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn cursor(&self) -> &YearCursor {
        &self.cursor
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn groups(&mut self) -> Arc<[YearGroup]> {
        if let Some((generation, groups)) = &self.cache.groups
            && *generation == self.generation
        {
            return Arc::clone(groups);
        }
        debug!("regrouping {} rows (generation {})", self.rows.len(), self.generation);
        let groups: Arc<[YearGroup]> = Arc::from(group_by_year(&self.rows));
        self.cache.groups = Some((self.generation, Arc::clone(&groups)));
        groups
    }

    /// Number of year labels (header excluded); drives the wrap.
    pub fn year_count(&mut self) -> usize {
        if let Some((generation, count)) = self.cache.year_count
            && generation == self.generation
        {
            return count;
        }
        let count = year_labels(&self.groups()).len();
        self.cache.year_count = Some((self.generation, count));
        count
    }

    pub fn year_labels(&mut self) -> Vec<String> {
        year_labels(&self.groups())
    }

    /// Frame for the current index.
    pub fn frame(&mut self) -> Frame {
        let key = (self.generation, self.cursor.index());
        if let Some((cached, frame)) = &self.cache.frame
            && *cached == key
        {
            return frame.clone();
        }
        let frame = build_frame(&self.groups(), key.1, &self.locale);
        self.cache.frame = Some((key, frame.clone()));
        frame
    }

    /// Advance the cursor by one timer tick. Returns the new index.
    pub fn tick(&mut self) -> usize {
        let count = self.year_count();
        let index = self.cursor.advance(count);
        debug!("tick -> index {index} of {count} years");
        index
    }

    /// Steps in one full animation cycle for the current rows.
    pub fn cycle_len(&mut self) -> usize {
        let count = self.year_count();
        self.cursor.cycle_len(count)
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }
}
