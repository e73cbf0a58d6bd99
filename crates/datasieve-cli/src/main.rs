//! datasieve CLI - data-quality scanner for tabular files.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            file,
            output,
            config,
            today,
            match_threshold,
            pattern_threshold,
            strategy,
            sheet,
            delimiter,
            report,
        } => commands::scan::run(
            commands::scan::ScanArgs {
                file,
                output,
                config,
                today,
                match_threshold,
                pattern_threshold,
                strategy,
                sheet,
                delimiter,
                report,
            },
            cli.verbose,
        ),

        Commands::Fields { config } => commands::fields::run(config, cli.verbose),

        Commands::Match {
            file,
            config,
            strategy,
        } => commands::match_cmd::run(file, config, strategy, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
