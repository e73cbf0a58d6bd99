//! Fields command - list the canonical field catalog.

use std::path::PathBuf;

use colored::Colorize;

use super::load_config;

pub fn run(config: Option<PathBuf>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref())?;
    config.validate()?;

    println!("{}", "Canonical fields:".yellow().bold());
    for field in config.catalog.iter() {
        let declared = field
            .declared_type
            .map(|t| t.label())
            .unwrap_or("-");
        println!(
            "  {:15} {:8} {}",
            field.kind.name().white().bold(),
            declared.cyan(),
            field.aliases.join(", ")
        );
    }

    if verbose {
        println!();
        println!(
            "Match threshold {} ({:?}), pattern coverage threshold {}%",
            config.matching.threshold,
            config.matching.strategy,
            config.pattern.coverage_threshold
        );
    }

    Ok(())
}
