//! Writers for annotated tables.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook};
use tracing::{info, warn};

use crate::error::{Result, SieveError};
use crate::merge::HexColor;

use super::annotated::{AnnotatedTable, LEADING_COLUMNS};

/// Worksheet size limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Output format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `.xlsx` with fills and frozen panes.
    Xlsx,
    /// Delimited text; values only.
    Delimited(u8),
}

impl OutputFormat {
    /// Determine the output format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Delimited(b',')),
            "tsv" => Ok(OutputFormat::Delimited(b'\t')),
            other => Err(SieveError::UnsupportedFormat(format!(
                "cannot write '.{}' output (expected .xlsx, .csv or .tsv)",
                other
            ))),
        }
    }
}

/// Write an annotated table to `path`, creating its parent directory.
pub fn write_annotated(table: &AnnotatedTable, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SieveError::io(parent, e))?;
        }
    }

    match format {
        OutputFormat::Xlsx => write_xlsx(table, path)?,
        OutputFormat::Delimited(delimiter) => {
            if !table.fills.is_empty() || !table.header_fills.is_empty() {
                warn!(
                    path = %path.display(),
                    "Cell colors cannot be represented in delimited output; writing values only"
                );
            }
            write_delimited(table, path, delimiter)?
        }
    }

    info!(path = %path.display(), rows = table.rows.len(), "Wrote annotated table");
    Ok(path.to_path_buf())
}

fn fill_format(color: HexColor) -> Format {
    Format::new().set_background_color(Color::RGB(color.rgb()))
}

fn write_xlsx(table: &AnnotatedTable, path: &Path) -> Result<()> {
    if table.rows.len() + 1 > MAX_ROWS || table.headers.len() > MAX_COLUMNS {
        return Err(SieveError::UnsupportedFormat(format!(
            "table of {} rows x {} columns exceeds worksheet limits",
            table.rows.len(),
            table.headers.len()
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        let col16 = col as u16;
        match table.header_fills.get(&col) {
            Some(&color) => {
                worksheet.write_string_with_format(0, col16, header, &fill_format(color))?;
            }
            None => {
                worksheet.write_string(0, col16, header)?;
            }
        }
    }

    for (index, row) in table.rows.iter().enumerate() {
        let row32 = (index + 1) as u32;
        worksheet.write_boolean(row32, 0, row.flag)?;
        if !row.issues.is_empty() {
            worksheet.write_string(row32, 1, &row.issues)?;
        }

        for (offset, cell) in row.cells.iter().enumerate() {
            let col = offset + LEADING_COLUMNS;
            let col16 = col as u16;
            let fill = table.fill_at(index, col).map(fill_format);

            match (cell.as_deref().map(|v| (v, numeric_value(v))), fill) {
                (Some((_, Some(number))), Some(format)) => {
                    worksheet.write_number_with_format(row32, col16, number, &format)?;
                }
                (Some((_, Some(number))), None) => {
                    worksheet.write_number(row32, col16, number)?;
                }
                (Some((value, None)), Some(format)) => {
                    worksheet.write_string_with_format(row32, col16, value, &format)?;
                }
                (Some((value, None)), None) => {
                    worksheet.write_string(row32, col16, value)?;
                }
                (None, Some(format)) => {
                    worksheet.write_blank(row32, col16, &format)?;
                }
                (None, None) => {}
            }
        }
    }

    worksheet.set_freeze_panes(1, LEADING_COLUMNS as u16)?;
    workbook.save(path)?;
    Ok(())
}

/// A cell written as a number only when that reproduces its text exactly.
///
/// Leading zeros, exponents and digits beyond f64 precision stay strings.
fn numeric_value(text: &str) -> Option<f64> {
    let number: f64 = text.parse().ok()?;
    (number.is_finite() && number.to_string() == text).then_some(number)
}

fn write_delimited(table: &AnnotatedTable, path: &Path, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(table.row_values(row))?;
    }
    writer
        .flush()
        .map_err(|e| SieveError::io(path.to_path_buf(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DataTable, Parser};
    use crate::merge::{ColorPalette, IssueMerger};
    use calamine::Reader;
    use tempfile::TempDir;

    fn annotated() -> AnnotatedTable {
        let table = DataTable::from_text(["A", "B"], vec![vec!["1", "x"], vec!["2", ""]]);
        let outcome = IssueMerger::default().merge(&table, &[]);
        AnnotatedTable::build(&table, &outcome, &ColorPalette::default())
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a.xlsx")).unwrap(), OutputFormat::Xlsx);
        assert_eq!(
            OutputFormat::from_path(Path::new("a.TSV")).unwrap(),
            OutputFormat::Delimited(b'\t')
        );
        assert!(OutputFormat::from_path(Path::new("a.json")).is_err());
    }

    #[test]
    fn test_write_csv_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let written = write_annotated(&annotated(), &path).unwrap();
        assert_eq!(written, path);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Flag,Issues,A,B");
        assert_eq!(lines[1], "True,,1,x");
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value("9876543210"), Some(9876543210.0));
        assert_eq!(numeric_value("-25.5"), Some(-25.5));
        assert_eq!(numeric_value("0123"), None);
        assert_eq!(numeric_value("1e5"), None);
        assert_eq!(numeric_value("12345678901234567"), None);
        assert_eq!(numeric_value("NaN"), None);
        assert_eq!(numeric_value("AB12"), None);
    }

    #[test]
    fn test_write_xlsx_keeps_numbers_numeric() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typed.xlsx");
        let table = DataTable::from_text(["Age", "Code"], vec![vec!["42", "0042"]]);
        let outcome = IssueMerger::default().merge(&table, &[]);
        write_annotated(
            &AnnotatedTable::build(&table, &outcome, &ColorPalette::default()),
            &path,
        )
        .unwrap();

        let mut workbook = calamine::open_workbook_auto(&path).unwrap();
        let sheet = workbook.sheet_names()[0].clone();
        let range = workbook.worksheet_range(&sheet).unwrap();
        assert_eq!(range.get_value((1, 2)), Some(&calamine::Data::Float(42.0)));
        assert_eq!(
            range.get_value((1, 3)),
            Some(&calamine::Data::String("0042".to_string()))
        );
    }

    #[test]
    fn test_write_xlsx_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        write_annotated(&annotated(), &path).unwrap();

        let (table, _) = Parser::new().parse_file(&path).unwrap();
        assert_eq!(table.headers, vec!["Flag", "Issues", "A", "B"]);
        assert_eq!(table.get(0, 0), Some("True"));
        assert_eq!(table.get(0, 2), Some("1"));
        assert_eq!(table.get(1, 3), None);
    }
}
