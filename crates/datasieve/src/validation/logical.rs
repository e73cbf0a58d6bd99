//! Semantic correctness rules for bound fields.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::FieldKind;
use crate::input::DataTable;
use crate::matching::FieldMap;

use super::dates::parse_day_first;
use super::finding::{ColumnFindings, FieldFindings, Source};
use super::Validator;

pub(crate) static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").unwrap());

static CONSONANT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^aeiouy\s]{5,}").unwrap());

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// Fixed inputs shared by every rule in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// Reference date for "in the future" checks.
    pub today: NaiveDate,
}

/// Applies semantic rules to each bound field.
#[derive(Debug, Clone)]
pub struct LogicalValidator {
    context: RuleContext,
}

impl LogicalValidator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            context: RuleContext { today },
        }
    }

    /// Run the rule for one field over a column's values.
    ///
    /// Fields without semantic rules produce no findings.
    pub fn check_field(&self, kind: FieldKind, values: &[Option<&str>]) -> FieldFindings {
        let ctx = &self.context;
        match kind {
            FieldKind::Dob => check_dob(values, ctx),
            FieldKind::Dod => check_dod(values, ctx),
            FieldKind::Age => check_age(values),
            FieldKind::Phone => check_phone(values),
            FieldKind::Email => check_email(values),
            FieldKind::Pan => check_pan(values),
            FieldKind::Address => check_address(values),
            FieldKind::Name => check_name(values),
            FieldKind::Ssn
            | FieldKind::AccountNumber
            | FieldKind::Gender
            | FieldKind::ZipCode
            | FieldKind::City => FieldFindings::new(),
        }
    }
}

impl Validator for LogicalValidator {
    fn source(&self) -> Source {
        Source::Logical
    }

    fn validate(&self, table: &DataTable, fields: &FieldMap) -> ColumnFindings {
        let mut findings = ColumnFindings::new(Source::Logical);

        for (kind, column) in fields.iter() {
            let Some(values) = table.column_by_name(column) else {
                debug!(field = %kind, column, "Bound column missing from table");
                continue;
            };
            let field = self.check_field(kind, &values);
            debug!(field = %kind, column, flagged = field.flagged.len(), "Logical rules applied");
            findings.record(column, field);
        }

        findings
    }
}

/// Date of birth: not in the future, not more than 150 years back.
pub fn check_dob(values: &[Option<&str>], ctx: &RuleContext) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(date) = value.and_then(parse_day_first) else {
            continue;
        };
        if date > ctx.today {
            findings.flag(row, "DOB is in the future");
        } else if ctx.today.year() - date.year() > 150 {
            findings.flag(row, "DOB implies age > 150 years");
        }
    }
    findings
}

/// Date of death: not in the future.
pub fn check_dod(values: &[Option<&str>], ctx: &RuleContext) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        if value
            .and_then(parse_day_first)
            .is_some_and(|date| date > ctx.today)
        {
            findings.flag(row, "DOD is in the future");
        }
    }
    findings
}

/// Age: between 0 and 140 inclusive.
pub fn check_age(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(age) = value.and_then(|v| v.trim().parse::<f64>().ok()) else {
            continue;
        };
        if age < 0.0 {
            findings.flag(row, "Age cannot be less than 0");
        } else if age > 140.0 {
            findings.flag(row, "Age cannot be more than 140");
        }
    }
    findings
}

/// Phone: every `|`-separated number has 10 or 12 digits.
pub fn check_phone(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in present(values) {
        for piece in value.split('|') {
            let digits = piece.trim().chars().filter(char::is_ascii_digit).count();
            if digits != 10 && digits != 12 {
                findings.flag(row, format!("Invalid phone: {}", piece));
            }
        }
    }
    findings
}

/// Email: every `|`-separated address has a minimal `local@domain.tld` shape.
pub fn check_email(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in present(values) {
        for piece in value.split('|') {
            if !EMAIL_SHAPE.is_match(piece.trim()) {
                findings.flag(row, format!("Invalid email: {}", piece));
            }
        }
    }
    findings
}

/// PAN: ten characters and unique within the column.
///
/// Length failures flag the cell; duplicates go to the duplicates bucket.
pub fn check_pan(values: &[Option<&str>]) -> FieldFindings {
    let trimmed: Vec<Option<&str>> = values
        .iter()
        .map(|v| v.map(str::trim).filter(|v| !v.is_empty()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in trimmed.iter().flatten() {
        *counts.entry(*value).or_default() += 1;
    }

    let mut findings = FieldFindings::new();
    for (row, value) in trimmed.iter().enumerate() {
        let Some(value) = value else {
            continue;
        };
        if value.chars().count() != 10 {
            findings.flag(row, "PAN is not 10 characters");
        }
        if counts.get(value).copied().unwrap_or(0) > 1 {
            findings.flag_duplicate(row, "PAN is duplicated");
        }
    }
    findings
}

/// Address: more than five characters.
pub fn check_address(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in values.iter().enumerate() {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        if value.chars().count() <= 5 {
            findings.flag(row, "Address is too short (5 characters or fewer)");
        }
    }
    findings
}

/// Name: plausibility heuristics on the transliterated, lowercased value.
pub fn check_name(values: &[Option<&str>]) -> FieldFindings {
    let mut findings = FieldFindings::new();
    for (row, value) in present(values) {
        if let Some(problem) = name_problem(value) {
            findings.flag(row, problem);
        }
    }
    findings
}

/// First failing name heuristic, if any.
pub fn name_problem(value: &str) -> Option<&'static str> {
    let name = deunicode::deunicode(value.trim()).trim().to_lowercase();
    if name.is_empty() {
        return None;
    }

    let has_vowel = name.contains(VOWELS);
    if has_repeated_run(&name, 4) {
        Some("Name has excessive repeated characters")
    } else if name.chars().count() <= 2 && !has_vowel {
        Some("Name is too short and has no vowels")
    } else if !has_vowel {
        Some("Name has no vowels")
    } else if CONSONANT_RUN.is_match(&name) {
        Some("Name has too many consecutive consonants")
    } else {
        None
    }
}

/// Whether `text` contains `len` or more identical consecutive characters.
fn has_repeated_run(text: &str, len: usize) -> bool {
    let mut run = 0;
    let mut previous = None;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            run = 1;
            previous = Some(c);
        }
        if run >= len {
            return true;
        }
    }
    false
}

/// Present, non-empty values with their row index.
fn present<'a>(values: &'a [Option<&'a str>]) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.filter(|v| !v.is_empty()).map(|v| (row, v)))
}
