//! Rule evaluation with boundary logging.
//!
//! ## Pipeline (in order)
//! 1. Decode rule parameters and the invoking event
//! 2. Obtain the configuration item (from the event, or from history)
//! 3. Applicability: active status, still in scope, admitted resource type
//! 4. Forced non-compliance short-circuit
//! 5. Fetch and decode the baseline, run the comparator
//! 6. Report the evaluation
//! 7. Notify on non-compliance when a topic is configured
//!
//! ## Logging Ownership
//!
//! This layer owns lifecycle logging for `evaluate`:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Collaborators and the comparator use only `tracing::debug!()`.

#![allow(clippy::result_large_err)]

use crate::event::{ConfigEvent, ConfigurationItem, InvokingEvent};
use crate::parameters::RuleParameters;
use conform_core::baseline::BaselineLocator;
use conform_core::collaborators::{BaselineStore, ConfigHistory, EvaluationReporter, Notifier};
use conform_core::compare::{CompareOptions, Comparator, Verdict, Violation};
use conform_core::compliance::{ComplianceStatus, Evaluation, Notification};
use conform_core::errors::{ExError, ExErrorKind, Result};
use conform_core::normalize::normalize_keys;
use conform_core::{log_op_end, log_op_error, log_op_start};
use conform_core_types::{RequestContext, RequestId};

pub const FORCED_NON_COMPLIANCE_ANNOTATION: &str =
    "non-compliance forced by rule parameter ForceNonCompliance";

/// The services one evaluation talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub baselines: &'a dyn BaselineStore,
    pub history: &'a dyn ConfigHistory,
    pub reporter: &'a dyn EvaluationReporter,
    pub notifier: &'a dyn Notifier,
}

/// Where the evaluated configuration item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    Event,
    History,
}

/// Result of one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub request_id: RequestId,
    pub compliance: ComplianceStatus,
    /// Full annotation; the reported one is truncated
    pub annotation: String,
    /// As submitted to the reporter
    pub evaluation: Evaluation,
    pub notified: bool,
    /// Digest of the baseline the comparator ran against
    pub baseline_digest: Option<String>,
    pub item_source: ItemSource,
    pub violation: Option<Violation>,
}

/// Evaluate one configuration-change event.
///
/// Baseline problems do not fail the call: they are reported as
/// `InsufficientData` with an explanatory annotation.
///
/// ## Errors
///
/// - `InvalidEvent` / `MissingField`: the envelope or invoking event is unusable
/// - `NotFound`: no history record for a summary-only event
/// - `ExternalService`: the reporter or notifier refused the result
pub fn evaluate(
    event: &ConfigEvent,
    collaborators: &Collaborators<'_>,
    ctx: &RequestContext,
) -> Result<EvaluationOutcome> {
    log_op_start!(
        "evaluate",
        request_id = %ctx.request_id,
        rule_name = %event.config_rule_name
    );
    let start = std::time::Instant::now();

    let outcome = evaluate_impl(event, collaborators, ctx).map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        log_op_error!(
            "evaluate",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id
        );
        e
    })?;

    log_op_end!(
        "evaluate",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %ctx.request_id,
        resource_id = %outcome.evaluation.resource_id,
        compliance = outcome.compliance.as_str()
    );

    Ok(outcome)
}

fn evaluate_impl(
    event: &ConfigEvent,
    collaborators: &Collaborators<'_>,
    ctx: &RequestContext,
) -> Result<EvaluationOutcome> {
    let params = event.parameters();
    let (item, item_source) = resolve_item(event.invoking()?, collaborators.history)?;

    if params.verbose {
        tracing::debug!(
            source = ?item_source,
            status = %item.status,
            resource_type = %item.resource_type,
            resource_id = %item.resource_id,
            document = %item.document,
            "configuration item"
        );
    }

    let judged = if !is_applicable(&item, event, &params) {
        Judgement::not_applicable()
    } else if params.force_non_compliance {
        Judgement::forced()
    } else {
        judge_against_baseline(&item, &params, collaborators.baselines)
    };

    let evaluation = Evaluation::new(
        item.resource_type.clone(),
        item.resource_id.clone(),
        judged.compliance,
        &judged.annotation,
        item.ordering_timestamp(),
    );

    collaborators
        .reporter
        .put_evaluation(event.result_token.expose(), &evaluation)
        .map_err(|e| external_failure("put_evaluation", &item, "evaluation report failed", e))?;

    let notified = match (&params.topic, judged.compliance) {
        (Some(topic), ComplianceStatus::NonCompliant) => {
            let rule_name = ctx
                .rule_name
                .as_deref()
                .unwrap_or(event.config_rule_name.as_str());
            let notification = Notification::non_compliance(
                topic.clone(),
                rule_name,
                &item.resource_type,
                &item.resource_id,
                Some(judged.annotation.as_str()),
            );
            collaborators
                .notifier
                .publish(&notification)
                .map_err(|e| external_failure("publish_notification", &item, "notification failed", e))?;
            true
        }
        _ => false,
    };

    Ok(EvaluationOutcome {
        request_id: ctx.request_id.clone(),
        compliance: judged.compliance,
        annotation: judged.annotation,
        evaluation,
        notified,
        baseline_digest: judged.baseline_digest,
        item_source,
        violation: judged.violation,
    })
}

/// Use the delivered item, or fetch and normalize the latest one from history.
fn resolve_item(
    invoking: InvokingEvent,
    history: &dyn ConfigHistory,
) -> Result<(ConfigurationItem, ItemSource)> {
    match invoking {
        InvokingEvent::Item(item) => Ok((item, ItemSource::Event)),
        InvokingEvent::Summary {
            resource_type,
            resource_id,
        } => {
            tracing::debug!(
                resource_type = %resource_type,
                resource_id = %resource_id,
                "configuration item not delivered, reading history"
            );
            let record = history.latest(&resource_type, &resource_id)?;
            let mut item = ConfigurationItem::from_document(normalize_keys(record))?;
            if item.resource_type.is_empty() {
                item.resource_type = resource_type;
            }
            if item.resource_id.is_empty() {
                item.resource_id = resource_id;
            }
            Ok((item, ItemSource::History))
        }
    }
}

fn is_applicable(item: &ConfigurationItem, event: &ConfigEvent, params: &RuleParameters) -> bool {
    if !item.is_active() || event.event_left_scope {
        return false;
    }
    if !params.admits(&item.resource_type) {
        tracing::debug!(
            resource_type = %item.resource_type,
            "resource type not listed in rule parameter ResourceTypes"
        );
        return false;
    }
    true
}

struct Judgement {
    compliance: ComplianceStatus,
    annotation: String,
    baseline_digest: Option<String>,
    violation: Option<Violation>,
}

impl Judgement {
    fn not_applicable() -> Self {
        Self::without_baseline(ComplianceStatus::NotApplicable, String::new())
    }

    fn forced() -> Self {
        Self::without_baseline(
            ComplianceStatus::NonCompliant,
            FORCED_NON_COMPLIANCE_ANNOTATION.to_string(),
        )
    }

    fn insufficient(annotation: String) -> Self {
        tracing::warn!(annotation = %annotation, "baseline unavailable");
        Self::without_baseline(ComplianceStatus::InsufficientData, annotation)
    }

    fn without_baseline(compliance: ComplianceStatus, annotation: String) -> Self {
        Self {
            compliance,
            annotation,
            baseline_digest: None,
            violation: None,
        }
    }
}

fn judge_against_baseline(
    item: &ConfigurationItem,
    params: &RuleParameters,
    baselines: &dyn BaselineStore,
) -> Judgement {
    let Some(raw_locator) = params.bucket.as_deref() else {
        return Judgement::insufficient("rule parameter Bucket is not set".to_string());
    };
    let locator = match BaselineLocator::parse(raw_locator) {
        Ok(locator) => locator,
        Err(e) => return Judgement::insufficient(format!("baseline locator: {}", e.message())),
    };

    let baseline = match baselines.fetch(&locator, &item.resource_id) {
        Ok(baseline) => baseline,
        Err(e) => {
            return Judgement::insufficient(format!(
                "fetch: locator={} key={} {}",
                locator,
                locator.key_for(&item.resource_id),
                e.message()
            ))
        }
    };
    let target = match baseline.decode() {
        Ok(target) => target,
        Err(e) => {
            return Judgement::insufficient(format!("baseline key={} {}", baseline.key, e.message()))
        }
    };

    let comparator = Comparator::new(CompareOptions {
        verbose: params.verbose,
        ..CompareOptions::default()
    });
    let verdict = comparator.compare(&item.document, &target);

    if let Verdict::NonCompliant(violation) = &verdict {
        tracing::debug!(
            resource_id = %item.resource_id,
            path = %violation.path,
            violation.code = violation.kind.code(),
            "item deviates from baseline"
        );
    }

    Judgement {
        compliance: ComplianceStatus::from(&verdict),
        annotation: verdict.annotation(),
        baseline_digest: Some(baseline.digest),
        violation: verdict.violation().cloned(),
    }
}

fn external_failure(op: &str, item: &ConfigurationItem, message: &str, cause: ExError) -> ExError {
    ExError::new(ExErrorKind::ExternalService)
        .with_op(op)
        .with_resource_type(item.resource_type.clone())
        .with_resource_id(item.resource_id.clone())
        .with_message(message)
        .with_source(cause)
}
