//! Annotated copy of the input table.

use std::collections::BTreeMap;

use crate::input::{Cell, DataTable};
use crate::merge::{ColorPalette, HexColor, MergeOutcome};

/// Name of the prepended clean/flagged column.
pub const FLAG_COLUMN: &str = "Flag";
/// Name of the prepended message column.
pub const ISSUES_COLUMN: &str = "Issues";
/// Columns inserted before the original data.
pub const LEADING_COLUMNS: usize = 2;

/// One output row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    /// `true` when the row has no findings.
    pub flag: bool,
    /// Messages joined with `"; "`.
    pub issues: String,
    /// Original cells.
    pub cells: Vec<Cell>,
}

/// The input table with `Flag` and `Issues` prepended and fills attached.
///
/// Column indices in `fills` and `header_fills` refer to `headers`, so the
/// first original column is at index 2.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTable {
    pub headers: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
    /// (row, column) -> cell fill.
    pub fills: BTreeMap<(usize, usize), HexColor>,
    /// Column -> header fill.
    pub header_fills: BTreeMap<usize, HexColor>,
}

impl AnnotatedTable {
    /// Combine a table with its merge outcome.
    pub fn build(table: &DataTable, outcome: &MergeOutcome, palette: &ColorPalette) -> Self {
        let mut headers = Vec::with_capacity(table.column_count() + LEADING_COLUMNS);
        headers.push(FLAG_COLUMN.to_string());
        headers.push(ISSUES_COLUMN.to_string());
        headers.extend(table.headers.iter().cloned());

        let rows = table
            .rows
            .iter()
            .enumerate()
            .map(|(index, cells)| AnnotatedRow {
                flag: outcome.is_clean(index),
                issues: outcome.issues(index),
                cells: cells.clone(),
            })
            .collect();

        let mut fills = BTreeMap::new();
        let mut header_fills = BTreeMap::new();
        for (index, header) in table.headers.iter().enumerate() {
            let column = index + LEADING_COLUMNS;
            if let Some(colored) = outcome.cell_colors.get(header) {
                for (&row, cell) in colored {
                    fills.insert((row, column), cell.color);
                }
            }
            if outcome.low_fill_columns.contains(header) {
                header_fills.insert(column, palette.low_fill);
            }
        }

        Self {
            headers,
            rows,
            fills,
            header_fills,
        }
    }

    /// Fill of a data cell, by output column index.
    pub fn fill_at(&self, row: usize, column: usize) -> Option<HexColor> {
        self.fills.get(&(row, column)).copied()
    }

    /// Number of rows without findings.
    pub fn clean_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.flag).count()
    }

    /// Output values of a row as text, in header order.
    pub fn row_values(&self, row: &AnnotatedRow) -> Vec<String> {
        let mut values = Vec::with_capacity(self.headers.len());
        values.push(if row.flag { "True" } else { "False" }.to_string());
        values.push(row.issues.clone());
        values.extend(row.cells.iter().map(|c| c.clone().unwrap_or_default()));
        values
    }
}
