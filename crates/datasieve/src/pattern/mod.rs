//! Statistical shape-outlier detection.
//!
//! Each cell is reduced to a signature describing its shape (word lengths,
//! digit runs, common words). Rows whose signature is rare within the column
//! are reported as outliers.

mod engine;
pub mod signature;

pub use engine::{Cluster, ClusterTable, ColumnPatterns, PatternConfig, PatternEngine, PatternReport};
pub use signature::CommonWords;
