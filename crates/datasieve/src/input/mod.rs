//! Table loading and data source handling.

mod parser;
mod source;

pub use parser::{InputFormat, Parser, ParserConfig};
pub use source::{text_cell, Cell, DataTable, SourceMetadata, NULL_TOKENS};
