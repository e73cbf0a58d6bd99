//! Main Sieve struct and public API.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::FieldCatalog;
use crate::error::{Result, SieveError};
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::matching::{ColumnMatcher, FieldMap, MatchConfig};
use crate::merge::{ColorPalette, IssueMerger, MergeOutcome, Priorities};
use crate::output::{write_annotated, AnnotatedTable};
use crate::pattern::{ClusterTable, PatternConfig, PatternEngine};
use crate::validation::{ColumnFindings, LogicalValidator, Source, TypeValidator, Validator};

/// Configuration for a scan.
///
/// Every key is optional when loaded from JSON; missing keys take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    /// Canonical fields, their aliases and declared types.
    pub catalog: FieldCatalog,
    /// Header matching.
    pub matching: MatchConfig,
    /// Pattern outlier detection.
    pub pattern: PatternConfig,
    /// Fill colors.
    pub colors: ColorPalette,
    /// Color priority per source.
    pub priorities: Priorities,
    /// Columns filled below this fraction get a highlighted header.
    pub low_fill_threshold: f64,
    /// Date used as "today" by date rules (None = current UTC date).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
    /// Table loading options (delimiter, worksheet).
    pub input: ParserConfig,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            catalog: FieldCatalog::default(),
            matching: MatchConfig::default(),
            pattern: PatternConfig::default(),
            colors: ColorPalette::default(),
            priorities: Priorities::default(),
            low_fill_threshold: 0.5,
            reference_date: None,
            input: ParserConfig::default(),
        }
    }
}

impl SieveConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SieveError::io(path, e))?;
        let config: SieveConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate().map_err(SieveError::Config)?;
        self.priorities.validate().map_err(SieveError::Config)?;
        self.input.validate().map_err(SieveError::Config)?;

        if self.matching.threshold > 100 {
            return Err(SieveError::Config(format!(
                "matching.threshold must be between 0 and 100, got {}",
                self.matching.threshold
            )));
        }
        let coverage = self.pattern.coverage_threshold;
        if !coverage.is_finite() || !(0.0..=100.0).contains(&coverage) {
            return Err(SieveError::Config(format!(
                "pattern.coverage_threshold must be between 0 and 100, got {}",
                coverage
            )));
        }
        if !self.low_fill_threshold.is_finite() || !(0.0..=1.0).contains(&self.low_fill_threshold) {
            return Err(SieveError::Config(format!(
                "low_fill_threshold must be between 0 and 1, got {}",
                self.low_fill_threshold
            )));
        }
        Ok(())
    }

    /// Reference date for date rules.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Result of scanning a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Metadata about the source file, when scanned from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// Date used as "today".
    pub reference_date: NaiveDate,
    /// Header bindings.
    pub fields: FieldMap,
    /// Semantic rule findings.
    pub logical: ColumnFindings,
    /// Shape outlier findings.
    pub pattern: ColumnFindings,
    /// Declared-type findings.
    pub dtype: ColumnFindings,
    /// Signature populations per column.
    pub clusters: IndexMap<String, ClusterTable>,
    /// Colors, row messages and fill ratios.
    pub outcome: MergeOutcome,
    /// Summary statistics.
    pub summary: ScanSummary,
}

impl ScanResult {
    /// Findings of each validator, in message order.
    pub fn findings(&self) -> [&ColumnFindings; 3] {
        [&self.logical, &self.pattern, &self.dtype]
    }
}

/// Summary of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Total number of data rows.
    pub total_rows: usize,
    /// Total number of columns.
    pub total_columns: usize,
    /// Number of canonical fields bound to a column.
    pub bound_fields: usize,
    /// Rows with at least one finding.
    pub flagged_rows: usize,
    /// Rows without findings.
    pub clean_rows: usize,
    /// Cells that received a color.
    pub colored_cells: usize,
    /// Colored cells by winning source.
    pub cells_by_source: BTreeMap<Source, usize>,
    /// Columns with a low fill ratio.
    pub low_fill_columns: usize,
    /// Fraction of clean rows (1.0 for an empty table).
    pub clean_ratio: f64,
}

impl ScanSummary {
    fn compute(table: &DataTable, fields: &FieldMap, outcome: &MergeOutcome) -> Self {
        let total_rows = table.row_count();
        let flagged_rows = outcome
            .flagged_rows()
            .into_iter()
            .filter(|&row| row < total_rows)
            .count();
        let clean_rows = total_rows - flagged_rows;

        Self {
            total_rows,
            total_columns: table.column_count(),
            bound_fields: fields.len(),
            flagged_rows,
            clean_rows,
            colored_cells: outcome.colored_cells(),
            cells_by_source: outcome.cells_by_source(),
            low_fill_columns: outcome.low_fill_columns.len(),
            clean_ratio: if total_rows == 0 {
                1.0
            } else {
                clean_rows as f64 / total_rows as f64
            },
        }
    }
}

/// The data-quality scanning pipeline.
pub struct Sieve {
    config: SieveConfig,
    today: NaiveDate,
    parser: Parser,
    matcher: ColumnMatcher,
    patterns: PatternEngine,
    logical: LogicalValidator,
    dtype: TypeValidator,
    merger: IssueMerger,
}

impl Sieve {
    /// Create a Sieve with default configuration.
    pub fn new() -> Self {
        Self::build(SieveConfig::default())
    }

    /// Create a Sieve with a custom configuration, validating it first.
    pub fn with_config(config: SieveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SieveConfig) -> Self {
        let today = config.today();
        Self {
            today,
            parser: Parser::with_config(config.input.clone()),
            matcher: ColumnMatcher::new(config.catalog.clone(), config.matching.clone()),
            patterns: PatternEngine::new(&config.pattern),
            logical: LogicalValidator::new(today),
            dtype: TypeValidator::new(config.catalog.clone()),
            merger: IssueMerger::new(
                config.colors.clone(),
                config.priorities.clone(),
                config.low_fill_threshold,
            ),
            config,
        }
    }

    /// Fix the date used as "today".
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = Some(date);
        self.today = date;
        self.logical = LogicalValidator::new(date);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    /// Date used as "today", resolved once when the pipeline was built.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Header matcher used by this pipeline.
    pub fn matcher(&self) -> &ColumnMatcher {
        &self.matcher
    }

    /// Load a table without scanning it.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Scan an in-memory table.
    pub fn scan_table(&self, table: &DataTable) -> ScanResult {
        let fields = self.matcher.match_headers(&table.headers);
        info!(bound = fields.len(), columns = table.column_count(), "Matched columns");

        let pattern_report = self.patterns.analyze_table(table);
        info!(cells = pattern_report.findings.cell_count(), "Pattern analysis complete");

        let logical = self.logical.validate(table, &fields);
        info!(
            cells = logical.cell_count(),
            duplicates = logical.duplicates.len(),
            "Logical validation complete"
        );

        let dtype = self.dtype.validate(table, &fields);
        info!(cells = dtype.cell_count(), "Type validation complete");

        let outcome = self
            .merger
            .merge(table, &[&logical, &pattern_report.findings, &dtype]);
        let summary = ScanSummary::compute(table, &fields, &outcome);
        info!(
            flagged_rows = summary.flagged_rows,
            colored_cells = summary.colored_cells,
            "Merged findings"
        );

        ScanResult {
            source: None,
            reference_date: self.today,
            fields,
            logical,
            pattern: pattern_report.findings,
            dtype,
            clusters: pattern_report.clusters,
            outcome,
            summary,
        }
    }

    /// Load and scan a file.
    pub fn scan(&self, path: impl AsRef<Path>) -> Result<ScanResult> {
        let (table, source) = self.load(path)?;
        let mut result = self.scan_table(&table);
        result.source = Some(source);
        Ok(result)
    }

    /// Render a scanned table to `output`.
    pub fn write(
        &self,
        table: &DataTable,
        result: &ScanResult,
        output: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let annotated = AnnotatedTable::build(table, &result.outcome, &self.config.colors);
        write_annotated(&annotated, output)
    }

    /// Load, scan and render in one step, returning the result as well.
    pub fn scan_and_write(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(ScanResult, PathBuf)> {
        let (table, source) = self.load(input)?;
        let mut result = self.scan_table(&table);
        result.source = Some(source);
        let path = self.write(&table, &result, output)?;
        Ok((result, path))
    }

    /// Scan `input` and write the annotated copy to `output`.
    pub fn process(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PathBuf> {
        self.scan_and_write(input, output).map(|(_, path)| path)
    }
}

impl Default for Sieve {
    fn default() -> Self {
        Self::new()
    }
}

/// `<stem>_processed.xlsx` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_processed.xlsx", stem))
}
