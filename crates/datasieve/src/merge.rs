//! Conflict resolution between validator findings.
//!
//! Every flagged cell receives exactly one color, taken from the highest
//! priority source that flagged it. Row messages are never filtered: a row
//! lists every message from every source, logical first, then pattern, then
//! dtype.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::DataTable;
use crate::validation::{ColumnFindings, RowMessages, Source};

/// A 24-bit RGB color, written as six hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(u32);

impl HexColor {
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0xFF_FFFF)
    }

    /// Packed `0xRRGGBB` value.
    pub fn rgb(&self) -> u32 {
        self.0
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{}': expected 6 hex digits", s));
        }
        u32::from_str_radix(digits, 16)
            .map(HexColor)
            .map_err(|e| format!("invalid color '{}': {}", s, e))
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

/// Fill colors per source, plus the low-fill header color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub logical: HexColor,
    pub pattern: HexColor,
    pub dtype: HexColor,
    pub low_fill: HexColor,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            logical: HexColor::new(0xEA697E),
            pattern: HexColor::new(0xE1EA69),
            dtype: HexColor::new(0x74EA69),
            low_fill: HexColor::new(0x2596BE),
        }
    }
}

impl ColorPalette {
    /// Fill color for a source.
    pub fn color_for(&self, source: Source) -> HexColor {
        match source {
            Source::Logical => self.logical,
            Source::Pattern => self.pattern,
            Source::Dtype => self.dtype,
        }
    }
}

/// Priority weights used to pick the winning color; higher wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priorities {
    pub logical: u8,
    pub pattern: u8,
    pub dtype: u8,
}

impl Default for Priorities {
    fn default() -> Self {
        Self {
            logical: 3,
            pattern: 2,
            dtype: 1,
        }
    }
}

impl Priorities {
    /// Weight of a source.
    pub fn weight(&self, source: Source) -> u8 {
        match source {
            Source::Logical => self.logical,
            Source::Pattern => self.pattern,
            Source::Dtype => self.dtype,
        }
    }

    /// Weights must be pairwise distinct so every conflict has one winner.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.logical == self.pattern
            || self.logical == self.dtype
            || self.pattern == self.dtype
        {
            return Err(format!(
                "priorities must be distinct (logical={}, pattern={}, dtype={})",
                self.logical, self.pattern, self.dtype
            ));
        }
        Ok(())
    }
}

/// Winning color for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellColor {
    pub color: HexColor,
    pub source: Source,
}

/// Column -> row -> winning color, columns in table order.
pub type CellColorAssignment = IndexMap<String, BTreeMap<usize, CellColor>>;

/// Everything the renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// One color per flagged cell.
    pub cell_colors: CellColorAssignment,
    /// Source-ordered messages per row.
    pub row_messages: RowMessages,
    /// Non-missing fraction per column.
    pub fill_ratios: IndexMap<String, f64>,
    /// Columns whose fill ratio is below the low-fill threshold.
    pub low_fill_columns: Vec<String>,
}

impl MergeOutcome {
    /// Color assigned to a cell, if any.
    pub fn color_at(&self, column: &str, row: usize) -> Option<&CellColor> {
        self.cell_colors.get(column).and_then(|rows| rows.get(&row))
    }

    /// Rows carrying at least one message.
    pub fn flagged_rows(&self) -> BTreeSet<usize> {
        self.row_messages.keys().copied().collect()
    }

    /// Whether a row has no findings at all.
    pub fn is_clean(&self, row: usize) -> bool {
        self.row_messages.get(&row).is_none_or(Vec::is_empty)
    }

    /// Messages of a row joined with `"; "`.
    pub fn issues(&self, row: usize) -> String {
        self.row_messages
            .get(&row)
            .map(|messages| messages.join("; "))
            .unwrap_or_default()
    }

    /// Number of colored cells.
    pub fn colored_cells(&self) -> usize {
        self.cell_colors.values().map(BTreeMap::len).sum()
    }

    /// Colored cells per winning source.
    pub fn cells_by_source(&self) -> BTreeMap<Source, usize> {
        let mut counts = BTreeMap::new();
        for color in self.cell_colors.values().flat_map(BTreeMap::values) {
            *counts.entry(color.source).or_insert(0) += 1;
        }
        counts
    }
}

/// Merges validator findings into colors and row messages.
#[derive(Debug, Clone)]
pub struct IssueMerger {
    palette: ColorPalette,
    priorities: Priorities,
    low_fill_threshold: f64,
}

impl Default for IssueMerger {
    fn default() -> Self {
        Self::new(ColorPalette::default(), Priorities::default(), 0.5)
    }
}

impl IssueMerger {
    pub fn new(palette: ColorPalette, priorities: Priorities, low_fill_threshold: f64) -> Self {
        Self {
            palette,
            priorities,
            low_fill_threshold,
        }
    }

    /// Merge findings from any number of validators.
    ///
    /// Findings naming columns absent from the table, and rows beyond its
    /// end, do not produce colors. Duplicate buckets only contribute messages.
    pub fn merge(&self, table: &DataTable, findings: &[&ColumnFindings]) -> MergeOutcome {
        let cell_colors = self.assign_colors(table, findings);
        let row_messages = collect_messages(findings);

        let mut fill_ratios = IndexMap::new();
        let mut low_fill_columns = Vec::new();
        for (index, header) in table.headers.iter().enumerate() {
            let ratio = table.fill_ratio(index);
            if ratio < self.low_fill_threshold {
                low_fill_columns.push(header.clone());
            }
            fill_ratios.insert(header.clone(), ratio);
        }

        debug!(
            colored = cell_colors.values().map(BTreeMap::len).sum::<usize>(),
            rows = row_messages.len(),
            low_fill = low_fill_columns.len(),
            "Merged findings"
        );

        MergeOutcome {
            cell_colors,
            row_messages,
            fill_ratios,
            low_fill_columns,
        }
    }

    fn assign_colors(&self, table: &DataTable, findings: &[&ColumnFindings]) -> CellColorAssignment {
        let mut assignment = CellColorAssignment::new();

        for header in &table.headers {
            let mut winners: BTreeMap<usize, CellColor> = BTreeMap::new();

            for found in findings {
                let Some(rows) = found.columns.get(header) else {
                    continue;
                };
                let weight = self.priorities.weight(found.source);
                let candidate = CellColor {
                    color: self.palette.color_for(found.source),
                    source: found.source,
                };

                for &row in rows.iter().filter(|&&row| row < table.row_count()) {
                    match winners.get(&row) {
                        Some(held) if self.priorities.weight(held.source) >= weight => {}
                        _ => {
                            winners.insert(row, candidate);
                        }
                    }
                }
            }

            if !winners.is_empty() {
                assignment.insert(header.clone(), winners);
            }
        }

        assignment
    }
}

/// Concatenate row messages in source order (logical, pattern, dtype).
fn collect_messages(findings: &[&ColumnFindings]) -> RowMessages {
    let mut messages = RowMessages::new();
    for source in Source::ALL {
        for found in findings.iter().filter(|f| f.source == source) {
            for (row, list) in &found.messages {
                messages.entry(*row).or_default().extend(list.iter().cloned());
            }
        }
    }
    messages
}
