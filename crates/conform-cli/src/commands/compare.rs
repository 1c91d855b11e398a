//! Compare command

use super::{read_document, CommandResult};
use clap::Args;
use conform_core::compare::{CompareOptions, Comparator, Verdict, DEFAULT_MAX_DEPTH};
use conform_core::normalize::normalize_keys;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Observed document
    #[arg(long)]
    pub item: PathBuf,

    /// Expected (baseline) document
    #[arg(long)]
    pub target: PathBuf,

    /// Normalize item keys before comparing (capitalized sources)
    #[arg(long)]
    pub normalize_item_keys: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Trace every compared node (needs RUST_LOG at debug)
    #[arg(long)]
    pub verbose: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: CompareArgs) -> CommandResult {
    let mut item = read_document(&args.item)?;
    let target = read_document(&args.target)?;
    if args.normalize_item_keys {
        item = normalize_keys(item);
    }

    let comparator = Comparator::new(CompareOptions {
        max_depth: args.max_depth,
        verbose: args.verbose,
    });
    let verdict = comparator.compare(&item, &target);

    if args.json {
        println!("{}", serde_json::to_string(&verdict)?);
        return Ok(());
    }

    match verdict {
        Verdict::Compliant => println!("COMPLIANT"),
        Verdict::NonCompliant(v) => println!("NON_COMPLIANT {} {}", v.kind.code(), v),
    }
    Ok(())
}
