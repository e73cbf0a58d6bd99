//! Findings produced by the validators.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which validator produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Semantic rules on bound fields.
    Logical,
    /// Statistical shape outliers.
    Pattern,
    /// Declared-type conformance.
    Dtype,
}

impl Source {
    /// All sources in message order.
    pub const ALL: [Source; 3] = [Source::Logical, Source::Pattern, Source::Dtype];

    pub fn label(&self) -> &'static str {
        match self {
            Source::Logical => "logical",
            Source::Pattern => "pattern",
            Source::Dtype => "dtype",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row index -> messages, in the order they were recorded.
pub type RowMessages = BTreeMap<usize, Vec<String>>;

/// Output of a single rule over one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFindings {
    /// Rows whose cell in this column is at fault.
    pub flagged: BTreeSet<usize>,
    /// Rows that are at fault without a paintable cell.
    pub duplicates: BTreeSet<usize>,
    /// Per-row messages.
    pub messages: RowMessages,
}

impl FieldFindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a row's cell with a message.
    pub fn flag(&mut self, row: usize, message: impl Into<String>) {
        self.flagged.insert(row);
        self.messages.entry(row).or_default().push(message.into());
    }

    /// Record a row in the duplicates bucket with a message.
    pub fn flag_duplicate(&mut self, row: usize, message: impl Into<String>) {
        self.duplicates.insert(row);
        self.messages.entry(row).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty() && self.duplicates.is_empty()
    }
}

/// Findings of one validator over a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFindings {
    /// Validator that produced these findings.
    pub source: Source,
    /// Column name -> flagged rows, in the order columns were examined.
    pub columns: IndexMap<String, BTreeSet<usize>>,
    /// Rows flagged without a cell to color (duplicate identifiers).
    pub duplicates: BTreeSet<usize>,
    /// Row -> messages.
    pub messages: RowMessages,
}

impl ColumnFindings {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            columns: IndexMap::new(),
            duplicates: BTreeSet::new(),
            messages: RowMessages::new(),
        }
    }

    /// Fold a column's findings in. Rows already flagged for the same column
    /// are unioned; messages are appended.
    pub fn record(&mut self, column: &str, findings: FieldFindings) {
        if !findings.flagged.is_empty() {
            self.columns
                .entry(column.to_string())
                .or_default()
                .extend(findings.flagged);
        }
        self.duplicates.extend(findings.duplicates);
        for (row, messages) in findings.messages {
            self.messages.entry(row).or_default().extend(messages);
        }
    }

    /// Whether a particular cell is flagged.
    pub fn is_flagged(&self, column: &str, row: usize) -> bool {
        self.columns
            .get(column)
            .is_some_and(|rows| rows.contains(&row))
    }

    /// Every row flagged in any column or in the duplicates bucket.
    pub fn flagged_rows(&self) -> BTreeSet<usize> {
        self.columns
            .values()
            .flatten()
            .chain(self.duplicates.iter())
            .copied()
            .collect()
    }

    /// Total number of flagged cells.
    pub fn cell_count(&self) -> usize {
        self.columns.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.duplicates.is_empty()
    }
}
