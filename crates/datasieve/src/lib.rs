//! datasieve: data-quality scanner for tabular datasets.
//!
//! datasieve binds raw column headers to a fixed catalog of canonical fields
//! (dates of birth, phone numbers, identifiers, names, ...), runs three
//! independent validators over the table and produces an annotated copy in
//! which every suspect cell is colored and every row carries its messages.
//!
//! # Validators
//!
//! - **Logical**: semantic rules per field (future dates, phone lengths,
//!   duplicate identifiers, implausible names)
//! - **Pattern**: shape signatures per column; rare shapes are outliers
//! - **Dtype**: conformance to the field's declared primitive type
//!
//! When several validators flag the same cell, the logical color wins over
//! the pattern color, which wins over the dtype color.
//!
//! # Example
//!
//! ```no_run
//! use datasieve::Sieve;
//!
//! let sieve = Sieve::new();
//! let result = sieve.scan("people.xlsx").unwrap();
//!
//! println!("Bound fields: {}", result.fields.len());
//! println!("Flagged rows: {}", result.summary.flagged_rows);
//!
//! sieve.process("people.xlsx", "people_processed.xlsx").unwrap();
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod matching;
pub mod merge;
pub mod output;
pub mod pattern;
pub mod validation;

mod sieve;

pub use crate::sieve::{default_output_path, ScanResult, ScanSummary, Sieve, SieveConfig};
pub use config::{CanonicalField, DeclaredType, FieldCatalog, FieldKind};
pub use error::{Result, SieveError};
pub use input::{DataTable, SourceMetadata};
pub use matching::{ColumnMatcher, FieldMap, MatchConfig, MatchStrategy};
pub use merge::{ColorPalette, HexColor, IssueMerger, MergeOutcome, Priorities};
pub use pattern::{PatternConfig, PatternEngine};
pub use validation::{ColumnFindings, LogicalValidator, Source, TypeValidator, Validator};
