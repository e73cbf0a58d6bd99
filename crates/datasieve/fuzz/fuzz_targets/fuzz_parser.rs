//! Fuzz target for delimited input parsing.
//!
//! Arbitrary bytes must either parse into a rectangular table or produce
//! an error, never a panic.

#![no_main]

use datasieve::input::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parser = Parser::new();

    for delimiter in [b',', b'\t', b';', b'|'] {
        if let Ok(table) = parser.parse_bytes(data, delimiter) {
            let width = table.column_count();
            assert!(table.rows.iter().all(|row| row.len() == width));
        }
    }
});
