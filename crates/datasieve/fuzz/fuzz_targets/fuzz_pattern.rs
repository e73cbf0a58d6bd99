//! Fuzz target for the pattern engine.
//!
//! Each line of input is one cell; an empty line is a missing cell.

#![no_main]

use datasieve::PatternEngine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let values: Vec<Option<&str>> = text
        .lines()
        .map(|line| if line.is_empty() { None } else { Some(line) })
        .collect();

    let engine = PatternEngine::default();
    let result = engine.analyze_column(&values);

    assert_eq!(result.signatures.len(), values.len());
    assert!(result.findings.flagged.iter().all(|&row| row < values.len()));
});
