//! Fuzzy binding of raw column headers to canonical fields.

mod matcher;
pub mod similarity;

pub use matcher::{ColumnMatcher, FieldMap, MatchConfig, MatchStrategy};
pub use similarity::weighted_ratio;
