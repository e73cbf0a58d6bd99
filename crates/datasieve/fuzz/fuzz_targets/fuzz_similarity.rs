//! Fuzz target for header similarity scoring.

#![no_main]

use datasieve::matching::similarity::weighted_ratio;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let (a, b) = text.split_at(text.char_indices().nth(text.chars().count() / 2).map_or(0, |(i, _)| i));

    assert!(weighted_ratio(a, b) <= 100);
});
