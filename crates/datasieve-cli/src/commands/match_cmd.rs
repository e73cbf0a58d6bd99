//! Match command - show how headers bind to canonical fields.

use std::path::PathBuf;

use colored::Colorize;
use datasieve::Sieve;

use super::load_config;
use crate::cli::StrategyChoice;

pub fn run(
    file: PathBuf,
    config: Option<PathBuf>,
    strategy: Option<StrategyChoice>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = load_config(config.as_deref())?;
    if let Some(strategy) = strategy {
        config.matching.strategy = strategy.into();
    }
    let threshold = config.matching.threshold;

    let sieve = Sieve::with_config(config)?;
    let (table, _) = sieve.load(&file)?;
    let fields = sieve.matcher().match_headers(&table.headers);

    println!("{}", "Bindings:".yellow().bold());
    for (kind, column) in fields.iter() {
        let score = sieve.matcher().score(column, kind);
        println!(
            "  {:15} <- {:25} {}",
            kind.name().white().bold(),
            column,
            score.to_string().green()
        );
    }

    let unbound: Vec<&str> = sieve
        .config()
        .catalog
        .iter()
        .filter(|f| fields.get(f.kind).is_none())
        .map(|f| f.kind.name())
        .collect();
    if !unbound.is_empty() {
        println!("  {} {}", "Unbound:".dimmed(), unbound.join(", ").dimmed());
    }

    println!();
    println!("{}", "Header scores:".yellow().bold());
    for header in &table.headers {
        let mut scores = sieve.matcher().scores(header);
        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let shown: Vec<String> = scores
            .iter()
            .filter(|(_, score)| verbose || *score >= threshold)
            .map(|(kind, score)| format!("{}={}", kind.name(), score))
            .collect();
        let label = match fields.field_for(header) {
            Some(kind) => format!("-> {}", kind.name()).green().to_string(),
            None => "unbound".dimmed().to_string(),
        };
        println!("  {:25} {:15} {}", header, label, shown.join(" "));
    }

    Ok(())
}
