//! Data source abstraction and metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens read as missing values when a table is loaded.
pub const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Metadata about the source data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (xlsx, csv, tsv, etc.).
    pub format: String,
    /// Worksheet the table was read from, for workbook formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the scan was performed.
    pub scanned_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            sheet: None,
            row_count,
            column_count,
            scanned_at: Utc::now(),
        }
    }

    /// Record the worksheet name.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

/// A single cell: `None` is a missing value, `Some` is present text
/// (possibly empty or whitespace-only).
pub type Cell = Option<String>;

/// Represents loaded tabular data.
///
/// Headers are trimmed and unique; rows always have exactly one cell per
/// header.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    /// Create a new data table, normalizing headers and row widths.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers = dedupe_headers(headers);
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Build a table from raw text cells, reading null tokens as missing.
    pub fn from_text<H, R, S>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<S>>,
        S: AsRef<str>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| row.iter().map(|v| text_cell(v.as_ref())).collect())
            .collect();
        Self::new(headers, rows)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }

    /// Position of a column by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).and_then(|c| c.as_deref())
    }

    /// Fraction of present (non-missing) cells in a column.
    ///
    /// A table without rows reports a full column.
    pub fn fill_ratio(&self, index: usize) -> f64 {
        if self.rows.is_empty() {
            return 1.0;
        }
        let present = self.column_values(index).filter(Option::is_some).count();
        present as f64 / self.rows.len() as f64
    }

    /// Check if a raw token represents a missing value.
    pub fn is_null_token(value: &str) -> bool {
        NULL_TOKENS.contains(&value)
    }
}

/// Convert raw cell text into a cell, mapping null tokens to `None`.
pub fn text_cell(value: &str) -> Cell {
    if DataTable::is_null_token(value) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Trim headers and make duplicates unique by appending `.1`, `.2`, ...
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let base = header.trim().to_string();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.push(candidate);
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_tokens() {
        assert!(DataTable::is_null_token(""));
        assert!(DataTable::is_null_token("NA"));
        assert!(DataTable::is_null_token("n/a"));
        assert!(DataTable::is_null_token("null"));
        assert!(!DataTable::is_null_token("  "));
        assert!(!DataTable::is_null_token("value"));
        assert!(!DataTable::is_null_token("0"));
    }

    #[test]
    fn test_headers_trimmed_and_deduplicated() {
        let table = DataTable::from_text(
            [" Name ", "Name", "Phone", "Name"],
            vec![vec!["a", "b", "c", "d"]],
        );
        assert_eq!(table.headers, vec!["Name", "Name.1", "Phone", "Name.2"]);
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let table = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![Some("1".into())], vec![Some("1".into()), Some("2".into()), Some("3".into())]],
        );
        assert_eq!(table.rows[0], vec![Some("1".to_string()), None]);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_fill_ratio() {
        let table = DataTable::from_text(["a", "b"], vec![vec!["1", ""], vec!["2", "x"], vec!["", ""], vec!["4", ""]]);
        assert_eq!(table.fill_ratio(0), 0.75);
        assert_eq!(table.fill_ratio(1), 0.25);

        let empty = DataTable::from_text(["a"], Vec::<Vec<&str>>::new());
        assert_eq!(empty.fill_ratio(0), 1.0);
    }

    #[test]
    fn test_whitespace_is_present() {
        let table = DataTable::from_text(["a"], vec![vec!["   "], vec!["NA"]]);
        assert_eq!(table.get(0, 0), Some("   "));
        assert_eq!(table.get(1, 0), None);
    }
}
