//! Integration tests for datasieve.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use datasieve::input::Parser;
use datasieve::output::read_report;
use datasieve::{
    default_output_path, FieldKind, MatchStrategy, ScanResult, Sieve, SieveConfig, SieveError,
    Source,
};

const PEOPLE: &str = "DOB,Mobile,PAN,Email\n\
                      01-01-2099,9876543210,AAAAA1111A,a@b.com\n\
                      15-08-1990,987654321,AAAAA1111A,bad-email\n\
                      31-02-2020,9876543210|12345,BBBBB2222B,c@d.org\n\
                      1990-01-01,9876543211,CCCCC3333C,e@f.net\n";

/// Helper to write `content` into `dir/name`.
fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn sieve() -> Sieve {
    Sieve::new().with_reference_date(today())
}

fn issues_of(result: &ScanResult, row: usize) -> String {
    result.outcome.issues(row)
}

// =============================================================================
// End-to-end Pipeline
// =============================================================================

#[test]
fn test_scan_binds_headers() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);

    let result = sieve().scan(&input).expect("Scan failed");

    assert_eq!(result.fields.get(FieldKind::Dob), Some("DOB"));
    assert_eq!(result.fields.get(FieldKind::Phone), Some("Mobile"));
    assert_eq!(result.fields.get(FieldKind::Pan), Some("PAN"));
    assert_eq!(result.fields.get(FieldKind::Email), Some("Email"));
    assert_eq!(result.fields.get(FieldKind::Gender), None);

    let source = result.source.as_ref().expect("source metadata");
    assert_eq!(source.format, "csv");
    assert_eq!(source.row_count, 4);
    assert!(source.hash.starts_with("sha256:"));
}

#[test]
fn test_scan_flags_rows() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);

    let result = sieve().scan(&input).unwrap();

    let row0 = issues_of(&result, 0);
    assert!(row0.contains("DOB is in the future"));
    assert!(row0.contains("PAN is duplicated"));

    let row1 = issues_of(&result, 1);
    assert!(row1.contains("Invalid phone: 987654321"));
    assert!(row1.contains("Invalid email: bad-email"));
    assert!(row1.contains("Invalid email format in list"));

    let row2 = issues_of(&result, 2);
    assert!(row2.contains("Invalid date format"));
    assert!(row2.contains("Invalid phone: 12345"));
    assert!(!row2.contains("Invalid phone: 9876543210"));

    assert!(result.outcome.is_clean(3));
    assert_eq!(issues_of(&result, 3), "");

    assert_eq!(result.summary.total_rows, 4);
    assert_eq!(result.summary.flagged_rows, 3);
    assert_eq!(result.summary.clean_rows, 1);
}

#[test]
fn test_logical_messages_precede_dtype_messages() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);

    let result = sieve().scan(&input).unwrap();
    let messages = &result.outcome.row_messages[&1];

    let logical = messages
        .iter()
        .position(|m| m == "Invalid email: bad-email")
        .unwrap();
    let dtype = messages
        .iter()
        .position(|m| m == "Invalid email format in list")
        .unwrap();
    assert!(logical < dtype);
}

#[test]
fn test_logical_color_wins_over_dtype() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);

    let result = sieve().scan(&input).unwrap();

    // Flagged by both validators
    let email = result.outcome.color_at("Email", 1).unwrap();
    assert_eq!(email.source, Source::Logical);
    assert_eq!(email.color, SieveConfig::default().colors.logical);

    // Flagged by dtype only
    let dob = result.outcome.color_at("DOB", 2).unwrap();
    assert_eq!(dob.source, Source::Dtype);

    // Duplicates are reported but never colored
    assert!(result.outcome.color_at("PAN", 0).is_none());
    assert!(result.outcome.color_at("PAN", 1).is_none());
}

#[test]
fn test_row_flag_iff_any_finding() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);

    let result = sieve().scan(&input).unwrap();

    for row in 0..result.summary.total_rows {
        let flagged = result.findings().iter().any(|f| {
            f.duplicates.contains(&row) || f.columns.values().any(|rows| rows.contains(&row))
        });
        assert_eq!(!result.outcome.is_clean(row), flagged, "row {}", row);
        assert_eq!(issues_of(&result, row).is_empty(), !flagged, "row {}", row);
    }
}

#[test]
fn test_process_writes_xlsx() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);
    let output = default_output_path(&input);
    assert_eq!(output, dir.path().join("people_processed.xlsx"));

    let written = sieve().process(&input, &output).expect("Process failed");
    assert_eq!(written, output);
    assert!(output.exists());

    let (table, meta) = Parser::new().parse_file(&output).unwrap();
    assert_eq!(meta.format, "xlsx");
    assert_eq!(
        table.headers,
        vec!["Flag", "Issues", "DOB", "Mobile", "PAN", "Email"]
    );
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.get(0, 0), Some("False"));
    assert_eq!(table.get(3, 0), Some("True"));
    assert_eq!(table.get(3, 1), None);
    assert_eq!(table.get(2, 3), Some("9876543210|12345"));
    assert_eq!(table.get(0, 4), Some("AAAAA1111A"));
}

#[test]
fn test_process_writes_csv() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);
    let output = dir.path().join("out").join("people.csv");

    sieve().process(&input, &output).unwrap();

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Flag,Issues,DOB,Mobile,PAN,Email");
    assert_eq!(lines[4], "True,,1990-01-01,9876543211,CCCCC3333C,e@f.net");
    assert!(lines[1].starts_with("False,"));
}

#[test]
fn test_scan_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);
    let sieve = sieve();

    let first = sieve.scan(&input).unwrap();
    let second = sieve.scan(&input).unwrap();

    assert_eq!(first.fields, second.fields);
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.findings(), second.findings());
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_report_roundtrip() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);
    let report = dir.path().join("reports").join("people.json");

    let result = sieve().scan(&input).unwrap();
    datasieve::output::write_report(&result, &report).unwrap();

    let loaded: ScanResult = read_report(&report).unwrap();
    assert_eq!(loaded.outcome, result.outcome);
    assert_eq!(loaded.fields, result.fields);
}

// =============================================================================
// Pattern Outliers
// =============================================================================

fn reference_column(outlier_at: usize) -> String {
    let mut content = String::from("Ref\n");
    for row in 0..200 {
        if row == outlier_at {
            content.push_str("zz9 qq\n");
        } else {
            content.push_str("AB123\n");
        }
    }
    content
}

#[test]
fn test_pattern_outlier_in_unbound_column() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "refs.csv", &reference_column(17));

    let result = sieve().scan(&input).unwrap();

    assert!(result.fields.is_empty());
    assert_eq!(result.pattern.flagged_rows().into_iter().collect::<Vec<_>>(), vec![17]);
    assert_eq!(
        issues_of(&result, 17),
        "Pattern coverage below 1.0% threshold"
    );
    assert_eq!(
        result.outcome.color_at("Ref", 17).map(|c| c.source),
        Some(Source::Pattern)
    );
    assert_eq!(result.summary.flagged_rows, 1);
}

#[test]
fn test_pattern_outlier_follows_value() {
    let dir = TempDir::new().unwrap();
    let sieve = sieve();

    for position in [0, 99, 199] {
        let input = create_test_file(&dir, "refs.csv", &reference_column(position));
        let result = sieve.scan(&input).unwrap();
        assert_eq!(
            result.pattern.flagged_rows().into_iter().collect::<Vec<_>>(),
            vec![position]
        );
    }
}

#[test]
fn test_pattern_threshold_override() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "refs.csv", &reference_column(5));

    let mut config = SieveConfig::default();
    config.pattern.coverage_threshold = 0.0;
    let sieve = Sieve::with_config(config).unwrap();

    let result = sieve.scan(&input).unwrap();
    assert!(result.pattern.flagged_rows().is_empty());
}

// =============================================================================
// Fill Ratio
// =============================================================================

#[test]
fn test_low_fill_column_detected() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(
        &dir,
        "sparse.csv",
        "Notes,City\n,Pune\n,Delhi\nseen,Mumbai\nNA,Chennai\n",
    );

    let result = sieve().scan(&input).unwrap();

    assert_eq!(result.outcome.low_fill_columns, vec!["Notes".to_string()]);
    assert_eq!(result.outcome.fill_ratios["Notes"], 0.25);
    assert_eq!(result.summary.low_fill_columns, 1);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_partial_keys() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(
        &dir,
        "config.json",
        r#"{"matching": {"strategy": "best_match"}, "reference_date": "2024-06-30"}"#,
    );

    let config = SieveConfig::from_json_file(&path).unwrap();
    assert_eq!(config.matching.strategy, MatchStrategy::BestMatch);
    assert_eq!(config.matching.threshold, 80);
    assert_eq!(config.reference_date, Some(today()));
    assert_eq!(config.low_fill_threshold, 0.5);
}

#[test]
fn test_config_input_delimiter_overrides_detection() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.txt", "DOB;Mobile\n01-01-2099;9876543210\n");
    let path = create_test_file(&dir, "config.json", r#"{"input": {"delimiter": ","}}"#);

    let detected = sieve().scan(&input).unwrap();
    assert_eq!(detected.summary.total_columns, 2);
    assert_eq!(detected.fields.get(FieldKind::Dob), Some("DOB"));

    let config = SieveConfig::from_json_file(&path).unwrap();
    let forced = Sieve::with_config(config).unwrap().scan(&input).unwrap();
    assert_eq!(forced.summary.total_columns, 1);
    assert_eq!(forced.source.unwrap().format, "csv");
}

#[test]
fn test_config_rejects_equal_priorities() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(
        &dir,
        "config.json",
        r#"{"priorities": {"logical": 2, "pattern": 2, "dtype": 1}}"#,
    );

    let err = SieveConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, SieveError::Config(_)));
}

#[test]
fn test_config_rejects_bad_color() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.json", r#"{"colors": {"logical": "zzzzzz"}}"#);

    let err = SieveConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, SieveError::Json(_)));
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn test_missing_input_file() {
    let err = sieve().scan(Path::new("/nonexistent/people.csv")).unwrap_err();
    assert!(matches!(err, SieveError::Io { .. }));
}

#[test]
fn test_unsupported_input_format() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.json", "{}");

    let err = sieve().scan(&input).unwrap_err();
    assert!(matches!(err, SieveError::UnsupportedFormat(_)));
}

#[test]
fn test_unsupported_output_format() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "people.csv", PEOPLE);

    let err = sieve()
        .process(&input, dir.path().join("people.pdf"))
        .unwrap_err();
    assert!(matches!(err, SieveError::UnsupportedFormat(_)));
}

#[test]
fn test_empty_input() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "empty.csv", "");

    let err = sieve().scan(&input).unwrap_err();
    assert!(matches!(err, SieveError::EmptyData(_)));
}

#[test]
fn test_header_only_input() {
    let dir = TempDir::new().unwrap();
    let input = create_test_file(&dir, "headers.csv", "DOB,Mobile\n");

    let result = sieve().scan(&input).unwrap();
    assert_eq!(result.summary.total_rows, 0);
    assert_eq!(result.summary.clean_ratio, 1.0);
    assert!(result.outcome.low_fill_columns.is_empty());
}
