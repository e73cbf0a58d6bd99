//! Scan command - validate a data file and write the annotated copy.

use std::path::PathBuf;

use chrono::NaiveDate;
use colored::Colorize;
use datasieve::output::write_report;
use datasieve::{default_output_path, ScanResult, Sieve, Source};
use tracing::debug;

use super::load_config;
use crate::cli::StrategyChoice;

/// Arguments of the scan command.
pub struct ScanArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub today: Option<NaiveDate>,
    pub match_threshold: Option<u8>,
    pub pattern_threshold: Option<f64>,
    pub strategy: Option<StrategyChoice>,
    pub sheet: Option<String>,
    pub delimiter: Option<char>,
    pub report: Option<PathBuf>,
}

pub fn run(args: ScanArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(date) = args.today {
        config.reference_date = Some(date);
    }
    if let Some(threshold) = args.match_threshold {
        config.matching.threshold = threshold;
    }
    if let Some(threshold) = args.pattern_threshold {
        config.pattern.coverage_threshold = threshold;
    }
    if let Some(strategy) = args.strategy {
        config.matching.strategy = strategy.into();
    }
    if args.sheet.is_some() {
        config.input.sheet = args.sheet;
    }
    if args.delimiter.is_some() {
        config.input.delimiter = args.delimiter;
    }

    println!(
        "{} {}",
        "Scanning".cyan().bold(),
        args.file.display().to_string().white()
    );

    let sieve = Sieve::with_config(config)?;
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.file));
    debug!(output = %output.display(), "Resolved output path");
    let (result, written) = sieve.scan_and_write(&args.file, &output)?;

    if verbose {
        print_bindings(&result);
    }
    print_summary(&result);

    if let Some(report) = args.report {
        write_report(&result, &report)?;
        println!(
            "{} {}",
            "Report saved to".green().bold(),
            report.display().to_string().white()
        );
    }

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        written.display().to_string().white()
    );

    Ok(())
}

fn print_bindings(result: &ScanResult) {
    println!();
    println!("{}", "Fields:".yellow().bold());
    if result.fields.is_empty() {
        println!("  {}", "(no headers matched)".dimmed());
    }
    for (kind, column) in result.fields.iter() {
        println!("  {:15} <- {}", kind.name(), column);
    }

    println!();
    println!("{}", "Findings per column:".yellow().bold());
    for findings in result.findings() {
        for (column, rows) in &findings.columns {
            if rows.is_empty() {
                continue;
            }
            println!(
                "  {:8} {:20} {} rows",
                findings.source.label(),
                column,
                rows.len()
            );
        }
        if !findings.duplicates.is_empty() {
            println!(
                "  {:8} {:20} {} rows",
                findings.source.label(),
                "Duplicates",
                findings.duplicates.len()
            );
        }
    }
}

fn print_summary(result: &ScanResult) {
    let summary = &result.summary;
    let count = |source: Source| summary.cells_by_source.get(&source).copied().unwrap_or(0);

    println!();
    println!(
        "Scanned {} rows x {} columns, {} fields bound",
        summary.total_rows.to_string().white().bold(),
        summary.total_columns.to_string().white().bold(),
        summary.bound_fields.to_string().white().bold()
    );
    println!(
        "Flagged {} rows, {} cells colored ({} logical, {} pattern, {} dtype)",
        summary.flagged_rows.to_string().red().bold(),
        summary.colored_cells.to_string().white().bold(),
        count(Source::Logical).to_string().red(),
        count(Source::Pattern).to_string().yellow(),
        count(Source::Dtype).to_string().green()
    );
    if summary.low_fill_columns > 0 {
        println!(
            "{} columns below the fill threshold",
            summary.low_fill_columns.to_string().blue()
        );
    }

    println!();
    println!("Clean rows: {:.0}%", summary.clean_ratio * 100.0);
    if summary.flagged_rows == 0 {
        println!("{}", "No issues found - data looks clean!".green());
    }
}
