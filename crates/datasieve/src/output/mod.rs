//! Rendering of the annotated table and the scan report.

mod annotated;
mod report;
mod writer;

pub use annotated::{AnnotatedRow, AnnotatedTable, FLAG_COLUMN, ISSUES_COLUMN, LEADING_COLUMNS};
pub use report::{read_report, write_report};
pub use writer::{write_annotated, OutputFormat};
