//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use datasieve::MatchStrategy;
use std::path::PathBuf;

/// datasieve: data-quality scanner for tabular files
#[derive(Parser)]
#[command(name = "datasieve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a data file and write an annotated copy
    Scan {
        /// Path to the data file (XLSX/XLS/ODS/CSV/TSV)
        #[arg(value_name = "INPUT")]
        file: PathBuf,

        /// Output path (default: <stem>_processed.xlsx next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reference date for date rules (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,

        /// Minimum header similarity (0-100)
        #[arg(long)]
        match_threshold: Option<u8>,

        /// Pattern coverage threshold in percent
        #[arg(long)]
        pattern_threshold: Option<f64>,

        /// Header matching strategy
        #[arg(long)]
        strategy: Option<StrategyChoice>,

        /// Worksheet to read from a workbook (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Delimiter for text input (default: auto-detect)
        #[arg(long)]
        delimiter: Option<char>,

        /// Also write the full scan result as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the canonical field catalog
    Fields {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show header bindings without running validators
    Match {
        /// Path to the data file
        #[arg(value_name = "INPUT")]
        file: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Header matching strategy
        #[arg(long)]
        strategy: Option<StrategyChoice>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {} (expected YYYY-MM-DD)", s, e))
}

/// Header matching strategy choice
#[derive(Clone, Copy, Debug, Default)]
pub enum StrategyChoice {
    /// First field in catalog order wins; later headers overwrite
    #[default]
    First,
    /// Highest score wins on both sides
    Best,
}

impl From<StrategyChoice> for MatchStrategy {
    fn from(choice: StrategyChoice) -> Self {
        match choice {
            StrategyChoice::First => MatchStrategy::FirstMatch,
            StrategyChoice::Best => MatchStrategy::BestMatch,
        }
    }
}

impl std::str::FromStr for StrategyChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "first" | "first_match" => Ok(StrategyChoice::First),
            "best" | "best_match" => Ok(StrategyChoice::Best),
            _ => Err(format!("Unknown strategy: {}. Use first or best.", s)),
        }
    }
}

impl std::fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyChoice::First => write!(f, "first"),
            StrategyChoice::Best => write!(f, "best"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_choice_parsing() {
        assert!(matches!("first".parse::<StrategyChoice>(), Ok(StrategyChoice::First)));
        assert!(matches!("Best-Match".parse::<StrategyChoice>(), Ok(StrategyChoice::Best)));
        assert!("random".parse::<StrategyChoice>().is_err());
        assert_eq!(StrategyChoice::Best.to_string(), "best");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-01"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(parse_date("01-03-2024").is_err());
    }

    #[test]
    fn test_cli_parses_input_options() {
        let cli = Cli::try_parse_from([
            "datasieve",
            "scan",
            "book.xlsx",
            "--sheet",
            "People",
            "--delimiter",
            ";",
        ])
        .unwrap();
        match cli.command {
            Commands::Scan { sheet, delimiter, .. } => {
                assert_eq!(sheet.as_deref(), Some("People"));
                assert_eq!(delimiter, Some(';'));
            }
            _ => panic!("expected scan"),
        }
        assert!(Cli::try_parse_from(["datasieve", "scan", "a.csv", "--delimiter", ";;"]).is_err());
    }

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::try_parse_from([
            "datasieve",
            "scan",
            "people.csv",
            "--today",
            "2024-06-30",
            "--strategy",
            "best",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan { file, today, strategy, .. } => {
                assert_eq!(file, PathBuf::from("people.csv"));
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 6, 30));
                assert!(matches!(strategy, Some(StrategyChoice::Best)));
            }
            _ => panic!("expected scan"),
        }
    }
}
