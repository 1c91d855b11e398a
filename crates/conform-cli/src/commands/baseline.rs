//! Baseline store commands

use super::CommandResult;
use clap::{Args, Subcommand};
use conform_store::{BaselineLocator, FsBaselineStore};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BaselineArgs {
    #[command(subcommand)]
    pub command: BaselineCommand,
}

#[derive(Debug, Subcommand)]
pub enum BaselineCommand {
    /// Record a document as the baseline of a resource
    Record(RecordArgs),
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Baseline store root
    #[arg(long)]
    pub store: PathBuf,

    /// Locator `<container>[/<prefix>]`
    #[arg(long)]
    pub locator: String,

    #[arg(long)]
    pub resource_id: String,

    /// Document to record
    #[arg(long)]
    pub item: PathBuf,
}

pub fn execute(args: BaselineArgs) -> CommandResult {
    match args.command {
        BaselineCommand::Record(record_args) => execute_record(record_args),
    }
}

fn execute_record(args: RecordArgs) -> CommandResult {
    let locator = BaselineLocator::parse(&args.locator)?;
    let document =
        std::fs::read(&args.item).map_err(|e| format!("{}: {}", args.item.display(), e))?;

    let store = FsBaselineStore::new(&args.store);
    let baseline = store.record(&locator, &args.resource_id, &document)?;

    println!("Baseline recorded:");
    println!("  container: {}", locator.container());
    println!("  key: {}", baseline.key);
    println!("  digest: {}", baseline.digest);
    Ok(())
}
