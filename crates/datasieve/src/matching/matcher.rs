//! Header-to-field binding.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{FieldCatalog, FieldKind};

use super::similarity::weighted_ratio;

/// How headers compete for fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Bind each header to the first field (catalog order) it clears the
    /// threshold for. A later header clearing the same field overwrites the
    /// earlier binding.
    #[default]
    FirstMatch,
    /// Each header proposes its best field; each field keeps its best header.
    BestMatch,
}

/// Configuration for header matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity (0-100) for a binding.
    pub threshold: u8,
    /// Competition strategy.
    pub strategy: MatchStrategy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 80,
            strategy: MatchStrategy::FirstMatch,
        }
    }
}

/// Ordered binding of canonical fields to column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    bindings: IndexMap<FieldKind, String>,
}

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a field to a column. Rebinding keeps the field's position.
    pub fn bind(&mut self, kind: FieldKind, column: impl Into<String>) -> Option<String> {
        self.bindings.insert(kind, column.into())
    }

    /// Column bound to a field.
    pub fn get(&self, kind: FieldKind) -> Option<&str> {
        self.bindings.get(&kind).map(String::as_str)
    }

    /// Field bound to a column, if any.
    pub fn field_for(&self, column: &str) -> Option<FieldKind> {
        self.bindings
            .iter()
            .find(|(_, c)| c.as_str() == column)
            .map(|(k, _)| *k)
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &str)> {
        self.bindings.iter().map(|(k, c)| (*k, c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(FieldKind, String)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (FieldKind, String)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (kind, column) in iter {
            map.bind(kind, column);
        }
        map
    }
}

/// Binds raw headers to canonical fields by fuzzy similarity.
#[derive(Debug, Clone)]
pub struct ColumnMatcher {
    catalog: FieldCatalog,
    config: MatchConfig,
}

impl ColumnMatcher {
    /// Create a matcher over a catalog.
    pub fn new(catalog: FieldCatalog, config: MatchConfig) -> Self {
        Self { catalog, config }
    }

    /// Best similarity of a header against any alias of a field.
    ///
    /// Fields missing from the catalog score 0.
    pub fn score(&self, header: &str, kind: FieldKind) -> u8 {
        self.catalog
            .get(kind)
            .map(|field| {
                field
                    .aliases
                    .iter()
                    .map(|alias| weighted_ratio(header, alias))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Scores of a header against every field, in catalog order.
    pub fn scores(&self, header: &str) -> Vec<(FieldKind, u8)> {
        self.catalog
            .iter()
            .map(|field| (field.kind, self.score(header, field.kind)))
            .collect()
    }

    /// Bind headers to fields using the configured strategy.
    pub fn match_headers<S: AsRef<str>>(&self, headers: &[S]) -> FieldMap {
        let map = match self.config.strategy {
            MatchStrategy::FirstMatch => self.first_match(headers),
            MatchStrategy::BestMatch => self.best_match(headers),
        };
        debug!(
            headers = headers.len(),
            bound = map.len(),
            strategy = ?self.config.strategy,
            "Matched headers"
        );
        map
    }

    fn first_match<S: AsRef<str>>(&self, headers: &[S]) -> FieldMap {
        let mut map = FieldMap::new();

        for header in headers {
            let header = header.as_ref();
            let hit = self
                .catalog
                .iter()
                .find(|field| self.score(header, field.kind) >= self.config.threshold);

            if let Some(field) = hit {
                if let Some(previous) = map.bind(field.kind, header) {
                    debug!(field = %field.kind, previous = %previous, column = header, "Rebound field");
                } else {
                    debug!(field = %field.kind, column = header, "Bound field");
                }
            }
        }

        map
    }

    fn best_match<S: AsRef<str>>(&self, headers: &[S]) -> FieldMap {
        // field -> (header index, score) of the strongest proposer
        let mut winners: IndexMap<FieldKind, (usize, u8)> = IndexMap::new();

        for (index, header) in headers.iter().enumerate() {
            let mut best: Option<(FieldKind, u8)> = None;
            for (kind, score) in self.scores(header.as_ref()) {
                if score >= self.config.threshold && best.is_none_or(|(_, s)| score > s) {
                    best = Some((kind, score));
                }
            }

            if let Some((kind, score)) = best {
                match winners.get(&kind) {
                    Some(&(_, held)) if held >= score => {}
                    _ => {
                        winners.insert(kind, (index, score));
                    }
                }
            }
        }

        let mut ordered: Vec<(FieldKind, usize)> =
            winners.into_iter().map(|(kind, (index, _))| (kind, index)).collect();
        ordered.sort_by_key(|&(_, index)| index);

        ordered
            .into_iter()
            .map(|(kind, index)| {
                let column = headers[index].as_ref().to_string();
                debug!(field = %kind, column = %column, "Bound field");
                (kind, column)
            })
            .collect()
    }
}
