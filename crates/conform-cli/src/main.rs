//! Conform CLI
//!
//! Command-line interface for baseline compliance checks

use clap::{Parser, Subcommand, ValueEnum};
use conform_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "conform")]
#[command(about = "Conform - check resource state against recorded baselines", long_about = None)]
struct Cli {
    /// Log output format (filter with RUST_LOG)
    #[arg(long, global = true, value_enum, default_value = "human")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare an item document against a target baseline
    Compare(commands::compare::CompareArgs),
    /// Lower-case the first letter of every object key
    Normalize(commands::normalize::NormalizeArgs),
    /// Evaluate a configuration-change event
    Evaluate(commands::evaluate::EvaluateArgs),
    /// Baseline store operations
    Baseline(commands::baseline::BaselineArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Normalize(args) => commands::normalize::execute(args),
        Commands::Evaluate(args) => commands::evaluate::execute(args),
        Commands::Baseline(args) => commands::baseline::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
