//! Per-field validators and their findings.

pub mod dates;
mod dtype;
mod finding;
mod logical;

pub use dates::parse_day_first;
pub use dtype::TypeValidator;
pub use finding::{ColumnFindings, FieldFindings, RowMessages, Source};
pub use logical::{name_problem, LogicalValidator, RuleContext};

use crate::input::DataTable;
use crate::matching::FieldMap;

/// Trait for validators that inspect bound columns.
pub trait Validator {
    /// Which source the findings are attributed to.
    fn source(&self) -> Source;

    /// Run validation over the table and collect findings.
    fn validate(&self, table: &DataTable, fields: &FieldMap) -> ColumnFindings;
}
