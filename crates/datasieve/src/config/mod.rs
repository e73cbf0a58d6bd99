//! Field catalog and stopword configuration.

mod catalog;
mod stopwords;

pub use catalog::{CanonicalField, DeclaredType, FieldCatalog, FieldKind};
pub use stopwords::{Stopwords, ENGLISH_STOPWORDS};
