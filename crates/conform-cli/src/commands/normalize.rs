//! Normalize command

use super::{read_document, CommandResult};
use clap::Args;
use conform_core::normalize::normalize_keys;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Single-line output
    #[arg(long)]
    pub compact: bool,
}

pub fn execute(args: NormalizeArgs) -> CommandResult {
    let normalized = normalize_keys(read_document(&args.input)?);
    let rendered = if args.compact {
        serde_json::to_string(&normalized)?
    } else {
        serde_json::to_string_pretty(&normalized)?
    };
    println!("{}", rendered);
    Ok(())
}
