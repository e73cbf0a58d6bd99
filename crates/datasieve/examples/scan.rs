//! Example: scan a tabular data file with datasieve.
//!
//! Usage:
//!   cargo run --example scan -- <file_path>
//!
//! Example:
//!   cargo run --example scan -- people.xlsx

use std::env;
use std::path::Path;

use datasieve::{default_output_path, Sieve, Source};

fn main() -> datasieve::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example scan -- <file_path>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("datasieve scan: {}", path.display());
    println!("{}", separator);
    println!();

    let sieve = Sieve::new();
    let output = default_output_path(path);
    let (result, written) = sieve.scan_and_write(path, &output)?;

    println!("FIELDS");
    println!("{}", "-".repeat(40));
    for (kind, column) in result.fields.iter() {
        println!("  {:15} <- {}", kind.name(), column);
    }
    println!();

    println!("FINDINGS");
    println!("{}", "-".repeat(40));
    for source in Source::ALL {
        let cells = result.summary.cells_by_source.get(&source).copied().unwrap_or(0);
        println!("  {:8} {} colored cells", source.label(), cells);
    }
    println!();

    for (row, messages) in result.outcome.row_messages.iter().take(10) {
        println!("  row {:5}: {}", row, messages.join("; "));
    }
    if result.outcome.row_messages.len() > 10 {
        println!("  ... and {} more rows", result.outcome.row_messages.len() - 10);
    }
    println!();

    println!(
        "{} of {} rows clean; annotated copy written to {}",
        result.summary.clean_rows,
        result.summary.total_rows,
        written.display()
    );

    Ok(())
}
