//! Table loader for workbook and delimited files.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{text_cell, Cell, DataTable, SourceMetadata};
use crate::error::{Result, SieveError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Spreadsheet workbook (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
    /// Delimited text (csv, tsv, psv, txt).
    Delimited,
}

impl InputFormat {
    /// Determine the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(InputFormat::Workbook),
            "csv" | "tsv" | "psv" | "txt" => Ok(InputFormat::Delimited),
            "" => Err(SieveError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                path.display()
            ))),
            other => Err(SieveError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use for text files (None = auto-detect).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    /// Worksheet to read (None = first sheet).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl ParserConfig {
    /// Check that the delimiter is a usable single-byte separator.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.delimiter_byte().map(|_| ())
    }

    fn delimiter_byte(&self) -> std::result::Result<Option<u8>, String> {
        match self.delimiter {
            None => Ok(None),
            Some(c) if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') => Ok(Some(c as u8)),
            Some(c) => Err(format!(
                "input.delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                c
            )),
        }
    }
}

/// Loads tabular data files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Load a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let format = InputFormat::from_path(path)?;

        let mut file = File::open(path).map_err(|e| SieveError::io(path, e))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SieveError::io(path, e))?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (table, format_name, sheet) = match format {
            InputFormat::Workbook => {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                let (table, sheet) = self.parse_workbook(contents)?;
                (table, ext, Some(sheet))
            }
            InputFormat::Delimited => {
                let configured = self.config.delimiter_byte().map_err(SieveError::Config)?;
                let delimiter = match configured {
                    Some(d) => d,
                    None => detect_delimiter(&contents)?,
                };
                let table = self.parse_bytes(&contents, delimiter)?;
                let name = match delimiter {
                    b'\t' => "tsv",
                    b',' => "csv",
                    b';' => "csv-semicolon",
                    b'|' => "psv",
                    _ => "delimited",
                };
                (table, name.to_string(), None)
            }
        };

        debug!(
            "Loaded {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );

        let mut metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format_name,
            table.row_count(),
            table.column_count(),
        );
        if let Some(sheet) = sheet {
            metadata = metadata.with_sheet(sheet);
        }

        Ok((table, metadata))
    }

    /// Parse delimited bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SieveError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<Cell> = record.iter().map(text_cell).collect();
            rows.push(row);
        }

        Ok(DataTable::new(headers, rows))
    }

    /// Parse a workbook held in memory, returning the table and sheet name.
    fn parse_workbook(&self, contents: Vec<u8>) -> Result<(DataTable, String)> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(contents))?;
        let sheet_names = workbook.sheet_names().to_vec();

        let sheet = match &self.config.sheet {
            Some(name) => {
                if !sheet_names.contains(name) {
                    return Err(SieveError::EmptyData(format!(
                        "Worksheet '{}' not found",
                        name
                    )));
                }
                name.clone()
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| SieveError::EmptyData("Workbook contains no sheets".to_string()))?,
        };

        let range = workbook.worksheet_range(&sheet)?;
        let mut rows_iter = range.rows();

        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(i, cell)| data_to_cell(cell).unwrap_or_else(|| format!("Unnamed: {}", i)))
                .collect(),
            None => return Err(SieveError::EmptyData(format!("Worksheet '{}' is empty", sheet))),
        };

        let mut rows = Vec::new();
        for row in rows_iter {
            let cells: Vec<Cell> = row.iter().map(data_to_cell).collect();
            // Blank rows inside the used range are not data.
            if cells.iter().all(Option::is_none) {
                continue;
            }
            rows.push(cells);
        }

        Ok((DataTable::new(headers, rows), sheet))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a workbook cell into the text representation used for scanning.
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => text_cell(s),
        Data::Int(n) => Some(n.to_string()),
        Data::Float(n) => Some(format_float(*n)),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => Some(format_excel_datetime(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Format a float, dropping the decimal part of integral values.
fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Serial of 10000-01-01 in the 1900 system, one past the last valid date.
const MAX_SERIAL: f64 = 2_958_466.0;

/// Render a date-formatted cell as ISO text.
///
/// Durations and serials outside the workbook date range keep their numeric
/// text.
fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    let serial = dt.as_f64();
    if dt.is_duration() || !(0.0..MAX_SERIAL).contains(&serial) {
        return format_float(serial);
    }

    match dt.as_datetime() {
        Some(datetime) if datetime.time() == NaiveTime::MIN => {
            datetime.format("%Y-%m-%d").to_string()
        }
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_float(serial),
    }
}

/// Lines sampled when sniffing the delimiter.
const SNIFF_LINES: usize = 10;
/// Bytes sampled when sniffing the delimiter.
const SNIFF_BYTES: usize = 64 * 1024;

/// Pick the delimiter that splits the sampled lines most consistently.
///
/// Candidates are ranked by: every line agrees with the header's separator
/// count, then the number of agreeing lines, then the header count. Tab wins
/// exact ties, then candidate order.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_BYTES)]);
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    if sample.is_empty() {
        return Err(SieveError::EmptyData("No lines to analyze".to_string()));
    }

    let best = DELIMITERS
        .iter()
        .rev()
        .filter_map(|&delimiter| {
            let counts: Vec<usize> = sample
                .iter()
                .map(|line| unquoted_count(line, delimiter))
                .collect();
            let header = counts[0];
            if header == 0 {
                return None;
            }
            let agreeing = counts.iter().filter(|&&c| c == header).count();
            Some((agreeing == counts.len(), agreeing, header, delimiter))
        })
        .max_by_key(|&(all, agreeing, header, delimiter)| (all, agreeing, header, delimiter == b'\t'))
        .map(|(.., delimiter)| delimiter);

    Ok(best.unwrap_or(b','))
}

/// Occurrences of `delimiter` outside double quotes.
fn unquoted_count(line: &str, delimiter: u8) -> usize {
    line.split('"')
        .step_by(2)
        .map(|outside| outside.bytes().filter(|&b| b == delimiter).count())
        .sum()
}
