//! Per-column shape clustering and outlier detection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Stopwords;
use crate::input::DataTable;
use crate::matching::FieldMap;
use crate::validation::{ColumnFindings, FieldFindings, Source, Validator};

use super::signature::{preprocess, signature, CommonWords};

/// Configuration for pattern analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Clusters holding less than this percentage of rows are outliers.
    pub coverage_threshold: f64,
    /// Replacement stopword list; `None` uses the English list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<Vec<String>>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 1.0,
            stopwords: None,
        }
    }
}

/// Population of one signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Rows with this signature.
    pub count: usize,
    /// Percentage of all rows in the column.
    pub share: f64,
}

/// Signature -> population, in first-occurrence order.
pub type ClusterTable = IndexMap<String, Cluster>;

/// Result of analyzing one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPatterns {
    /// Common-word side table used during classification.
    pub common_words: CommonWords,
    /// Signature per row (empty for missing or token-less cells).
    pub signatures: Vec<String>,
    /// Signature populations.
    pub clusters: ClusterTable,
    /// Outlier rows and their messages.
    pub findings: FieldFindings,
}

/// Result of analyzing every column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Outlier findings keyed by column.
    pub findings: ColumnFindings,
    /// Cluster table per column, in table order.
    pub clusters: IndexMap<String, ClusterTable>,
}

/// Flags cells whose shape is rare within their column.
#[derive(Debug, Clone)]
pub struct PatternEngine {
    threshold: f64,
    stopwords: Stopwords,
}

impl PatternEngine {
    pub fn new(config: &PatternConfig) -> Self {
        let stopwords = match &config.stopwords {
            Some(words) => Stopwords::new(words),
            None => Stopwords::english(),
        };
        Self {
            threshold: config.coverage_threshold,
            stopwords,
        }
    }

    /// Coverage threshold in percent.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Message attached to every outlier row.
    pub fn message(&self) -> String {
        format!(
            "Pattern coverage below {}% threshold",
            format_threshold(self.threshold)
        )
    }

    /// Analyze one column's values.
    pub fn analyze_column(&self, values: &[Option<&str>]) -> ColumnPatterns {
        let processed: Vec<Option<String>> = values
            .iter()
            .map(|v| v.map(|text| preprocess(text, &self.stopwords)))
            .collect();

        // Aggregation completes before any row is classified.
        let common_words = CommonWords::from_texts(processed.iter().flatten().map(String::as_str));

        let signatures: Vec<String> = processed
            .iter()
            .map(|text| {
                text.as_deref()
                    .map(|t| signature(t, &common_words))
                    .unwrap_or_default()
            })
            .collect();

        let clusters = self.cluster(&signatures);

        let message = self.message();
        let mut findings = FieldFindings::new();
        for (row, sig) in signatures.iter().enumerate() {
            let rare = clusters
                .get(sig)
                .is_some_and(|cluster| cluster.share < self.threshold);
            if rare {
                findings.flag(row, message.clone());
            }
        }

        ColumnPatterns {
            common_words,
            signatures,
            clusters,
            findings,
        }
    }

    /// Analyze every column of a table, bound or not.
    pub fn analyze_table(&self, table: &DataTable) -> PatternReport {
        let mut findings = ColumnFindings::new(Source::Pattern);
        let mut clusters = IndexMap::new();

        for (index, header) in table.headers.iter().enumerate() {
            let values: Vec<Option<&str>> = table.column_values(index).collect();
            let column = self.analyze_column(&values);
            debug!(
                column = %header,
                clusters = column.clusters.len(),
                outliers = column.findings.flagged.len(),
                "Pattern analysis"
            );
            findings.record(header, column.findings);
            clusters.insert(header.clone(), column.clusters);
        }

        PatternReport { findings, clusters }
    }

    fn cluster(&self, signatures: &[String]) -> ClusterTable {
        let total = signatures.len();
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for sig in signatures.iter().filter(|s| !s.is_empty()) {
            *counts.entry(sig.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(sig, count)| {
                let share = count as f64 / total as f64 * 100.0;
                (sig.to_string(), Cluster { count, share })
            })
            .collect()
    }
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(&PatternConfig::default())
    }
}

impl Validator for PatternEngine {
    fn source(&self) -> Source {
        Source::Pattern
    }

    fn validate(&self, table: &DataTable, _fields: &FieldMap) -> ColumnFindings {
        self.analyze_table(table).findings
    }
}

/// Render a threshold with at least one decimal place (`1.0`, `2.5`).
fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
