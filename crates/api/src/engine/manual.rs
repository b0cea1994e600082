//! Human-driven execution paths: manual execute and preview.
//!
//! Both reuse the same ledger and executor as the orchestrator. Preview is
//! the dry-run form: identical guard logic, zero writes.

use serde::Serialize;
use serde_json::json;

use domus_core::audit::actions;
use domus_core::error::CoreError;
use domus_core::execution::{ExecutionOutcome, ExecutionStatus};
use domus_core::proposal::Proposal;
use domus_core::types::DbId;
use domus_db::models::audit::CreateAudit;
use domus_db::repositories::{ApprovalRepo, AuditRepo};
use domus_db::DbPool;
use domus_events::EventBus;

use crate::config::AutomationConfig;
use crate::engine::dispatch::ActionDispatcher;
use crate::engine::executor::{Executor, ExecutorFlags};
use crate::error::AppError;

/// Result of a manual execute or preview call.
#[derive(Debug, Serialize)]
pub struct ManualExecuteReport {
    pub approval_id: DbId,
    pub proposal_id: String,
    pub dry_run: bool,
    pub outcome: ExecutionOutcome,
}

/// Execute (or preview) one approved proposal by approval id.
///
/// Guards, in order: unknown approval → 404; rejected decision → skip;
/// `executed_at` already set → skip without re-invoking the executor.
/// With `dry_run` the executor computes the would-be outcome against live
/// state and nothing is persisted -- not even audit rows.
pub async fn execute_approval(
    pool: &DbPool,
    event_bus: &EventBus,
    dispatcher: &dyn ActionDispatcher,
    config: &AutomationConfig,
    approval_id: DbId,
    actor: &str,
    dry_run: bool,
) -> Result<ManualExecuteReport, AppError> {
    let approval = ApprovalRepo::find_by_id(pool, approval_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Approval",
            id: approval_id,
        })?;

    let report = |outcome: ExecutionOutcome| ManualExecuteReport {
        approval_id: approval.id,
        proposal_id: approval.proposal_id.clone(),
        dry_run,
        outcome,
    };

    if !approval.is_approved() {
        return Ok(report(ExecutionOutcome::skipped(
            "Proposal was rejected",
            json!(null),
        )));
    }

    if approval.executed_at.is_some() {
        return Ok(report(ExecutionOutcome::skipped(
            "Already executed",
            json!(null),
        )));
    }

    let proposal: Proposal = serde_json::from_value(approval.proposal_snapshot.clone())
        .map_err(|e| AppError::InternalError(format!("Corrupt proposal snapshot: {e}")))?;

    let executor = Executor::new(
        pool,
        dispatcher,
        event_bus,
        ExecutorFlags {
            remind_invoice: config.remind_invoice_enabled,
            escalate_ticket: config.escalate_ticket_enabled,
            // Dry runs stay off the activity channel too.
            audit: config.executor_audit && !dry_run,
        },
    );

    let outcome = executor.execute(&proposal, actor, dry_run).await?;

    if dry_run {
        return Ok(report(outcome));
    }

    match outcome.status {
        ExecutionStatus::Executed => {
            if ApprovalRepo::mark_executed(pool, approval.id, &outcome.to_json())
                .await?
                .is_none()
            {
                // Raced with another execution; the first write wins.
                return Ok(report(ExecutionOutcome::skipped(
                    "Already executed",
                    json!(null),
                )));
            }
            AuditRepo::insert(
                pool,
                &CreateAudit {
                    approval_id: approval.id,
                    proposal_id: approval.proposal_id.clone(),
                    proposal_kind: proposal.kind.as_str().to_string(),
                    action: actions::AUTO_EXECUTED,
                    actor_id: actor.to_string(),
                    dry_run: false,
                    result: Some(outcome.to_json()),
                },
            )
            .await?;
            tracing::info!(
                approval_id = approval.id,
                proposal_id = %approval.proposal_id,
                actor,
                "Approval executed manually"
            );
        }
        ExecutionStatus::Skipped => {
            AuditRepo::insert(
                pool,
                &CreateAudit {
                    approval_id: approval.id,
                    proposal_id: approval.proposal_id.clone(),
                    proposal_kind: proposal.kind.as_str().to_string(),
                    action: actions::SKIP,
                    actor_id: actor.to_string(),
                    dry_run: false,
                    result: Some(outcome.to_json()),
                },
            )
            .await?;
        }
        ExecutionStatus::Failed => {}
    }

    Ok(report(outcome))
}
