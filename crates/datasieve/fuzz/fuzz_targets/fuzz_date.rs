//! Fuzz target for the day-first date parser.
//!
//! The parser must never panic, and any four-digit-year date it returns
//! must survive a round trip through its own ISO rendering.

#![no_main]

use chrono::Datelike;
use datasieve::validation::parse_day_first;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    if let Some(date) = parse_day_first(&input).filter(|d| (1000..=9999).contains(&d.year())) {
        let iso = date.format("%Y-%m-%d").to_string();
        assert_eq!(parse_day_first(&iso), Some(date));
    }
});
