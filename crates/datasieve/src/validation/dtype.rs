//! Declared-type conformance checks.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::{DeclaredType, FieldCatalog, FieldKind};
use crate::input::DataTable;
use crate::matching::FieldMap;

use super::dates::parse_day_first;
use super::finding::{ColumnFindings, FieldFindings, Source};
use super::logical::EMAIL_SHAPE;
use super::Validator;

/// `['value']` wrappers left behind by list-valued exports.
static LIST_WRAPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\['([^']+)'\]").unwrap());

/// Checks each bound field against its declared primitive type.
#[derive(Debug, Clone)]
pub struct TypeValidator {
    catalog: FieldCatalog,
}

impl TypeValidator {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    /// Check a column's values as the given field.
    ///
    /// Fields without a declared type produce no findings.
    pub fn check_field(&self, kind: FieldKind, values: &[Option<&str>]) -> FieldFindings {
        match self.catalog.declared_type(kind) {
            Some(DeclaredType::Date) => check_date(values),
            Some(DeclaredType::Numeric) if kind == FieldKind::Age => check_whole_number(values),
            Some(DeclaredType::Numeric) => check_numeric_list(values),
            Some(DeclaredType::Text) => check_text(values),
            Some(DeclaredType::Email) => check_email_list(values),
            None => FieldFindings::new(),
        }
    }
}

impl Validator for TypeValidator {
    fn source(&self) -> Source {
        Source::Dtype
    }

    fn validate(&self, table: &DataTable, fields: &FieldMap) -> ColumnFindings {
        let mut findings = ColumnFindings::new(Source::Dtype);

        for (kind, column) in fields.iter() {
            let Some(values) = table.column_by_name(column) else {
                continue;
            };
            let field = self.check_field(kind, &values);
            debug!(field = %kind, column, flagged = field.flagged.len(), "Type checks applied");
            findings.record(column, field);
        }

        findings
    }
}

/// Dates must parse (day-first). Blank values and `[]` are skipped.
pub fn check_date(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_empty() && *v != "[]") else {
            continue;
        };
        if parse_day_first(unwrap_list(value.trim())).is_none() {
            findings.flag(row, "Invalid date format");
        }
    }
    findings
}

/// Every `|`-separated piece must be non-empty and numeric.
pub fn check_numeric_list(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        let numeric = value.split('|').all(|piece| {
            let piece = piece.trim();
            !piece.is_empty() && piece.chars().all(char::is_numeric)
        });
        if !numeric {
            findings.flag(row, "Non-numeric value in list");
        }
    }
    findings
}

/// Value must be a finite number without a fractional part.
pub fn check_whole_number(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        let whole = value
            .trim()
            .parse::<f64>()
            .is_ok_and(|n| n.is_finite() && n.fract() == 0.0);
        if !whole {
            findings.flag(row, "Age must be a whole number");
        }
    }
    findings
}

/// Present text must not be blank.
pub fn check_text(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        if value.is_some_and(|v| v.trim().is_empty()) {
            findings.flag(row, "Empty or whitespace text");
        }
    }
    findings
}

/// Every `|`-separated piece must look like an email address.
pub fn check_email_list(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        if !value.split('|').all(|piece| EMAIL_SHAPE.is_match(piece.trim())) {
            findings.flag(row, "Invalid email format in list");
        }
    }
    findings
}

fn unwrap_list(value: &str) -> &str {
    LIST_WRAPPER
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map_or(value, |inner| inner.as_str())
}
