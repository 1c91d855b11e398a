//! Evaluate command
//!
//! Runs one rule evaluation with filesystem collaborators.

use super::CommandResult;
use clap::Args;
use conform_core::collaborators::{
    ConfigHistory, EvaluationReporter, NoopConfigHistory, NoopSink, Notifier,
};
use conform_core_types::RequestContext;
use conform_engine::{evaluate, Collaborators, ConfigEvent};
use conform_store::{FsBaselineStore, FsConfigHistory, FsOutbox};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Event envelope (JSON)
    #[arg(long)]
    pub event: PathBuf,

    /// Baseline store root
    #[arg(long)]
    pub store: PathBuf,

    /// Configuration history root, for summary-only events
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// JSON-lines file receiving evaluations and notifications
    #[arg(long)]
    pub outbox: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> CommandResult {
    let bytes = std::fs::read(&args.event).map_err(|e| format!("{}: {}", args.event.display(), e))?;
    let event = ConfigEvent::from_slice(&bytes)?;

    let baselines = FsBaselineStore::new(&args.store);
    let history: Box<dyn ConfigHistory> = match &args.history {
        Some(root) => Box::new(FsConfigHistory::new(root)),
        None => Box::new(NoopConfigHistory),
    };
    let outbox = args.outbox.as_ref().map(FsOutbox::new);
    let (reporter, notifier): (&dyn EvaluationReporter, &dyn Notifier) = match &outbox {
        Some(outbox) => (outbox as &dyn EvaluationReporter, outbox as &dyn Notifier),
        None => (&NoopSink as &dyn EvaluationReporter, &NoopSink as &dyn Notifier),
    };

    let collaborators = Collaborators {
        baselines: &baselines,
        history: history.as_ref(),
        reporter,
        notifier,
    };
    let ctx = RequestContext::new().with_rule_name(event.config_rule_name.clone());
    let outcome = evaluate(&event, &collaborators, &ctx)?;

    println!("Evaluation reported:");
    println!("  request_id: {}", outcome.request_id);
    println!(
        "  resource: {} {}",
        outcome.evaluation.resource_type, outcome.evaluation.resource_id
    );
    println!("  compliance: {}", outcome.compliance);
    if !outcome.annotation.is_empty() {
        println!("  annotation: {}", outcome.annotation);
    }
    if let Some(digest) = &outcome.baseline_digest {
        println!("  baseline_digest: {}", digest);
    }
    if outcome.notified {
        println!("  (notification published)");
    }
    Ok(())
}
