//! The orchestrator: one automatic pipeline invocation.
//!
//! Pulls candidates, generates proposals, evaluates policy, records
//! approvals idempotently, enforces the per-kind daily budget, executes,
//! and audits. Individual proposals never abort the run; only
//! infrastructure errors (storage unavailable) propagate to the caller.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use domus_core::audit::{actions, REASON_DAILY_LIMIT_EXCEEDED, REASON_KILL_SWITCH_OFF, SYSTEM_ACTOR};
use domus_core::execution::{ExecutionOutcome, ExecutionStatus};
use domus_core::policy::{self, PolicySnapshot, REASON_AUTO_EXECUTE_DISABLED};
use domus_core::proposal::{generate_proposals, GenerationWindow, Proposal, ProposalKind};
use domus_core::severity::Severity;
use domus_core::types::{DbId, Timestamp};
use domus_db::models::approval::CreateApproval;
use domus_db::models::audit::CreateAudit;
use domus_db::repositories::{ApprovalRepo, AuditRepo, InvoiceRepo, PolicyRepo, TicketRepo};
use domus_db::DbPool;
use domus_events::EventBus;

use crate::config::AutomationConfig;
use crate::engine::dispatch::ActionDispatcher;
use crate::engine::executor::{Executor, ExecutorFlags};

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Decision recorded for one proposal in the run result list.
pub mod decisions {
    /// The run created the approval row.
    pub const AUTO_APPROVED: &str = "AUTO_APPROVED";
    /// An earlier run or an operator already approved this proposal.
    pub const ALREADY_APPROVED: &str = "ALREADY_APPROVED";
    /// An operator already rejected this proposal; never executed.
    pub const ALREADY_REJECTED: &str = "ALREADY_REJECTED";
    /// Policy withheld automation; no approval row exists.
    pub const SKIPPED: &str = "SKIPPED";
}

/// Per-proposal result of one auto-run invocation.
#[derive(Debug, Serialize)]
pub struct AutoRunItem {
    pub proposal_id: String,
    pub proposal_kind: &'static str,
    pub target_id: DbId,
    pub severity: Severity,
    /// One of the [`decisions`] constants.
    pub decision: &'static str,
    /// Why automation was withheld, when it was.
    pub decision_reason: Option<&'static str>,
    pub approval_id: Option<DbId>,
    /// Present once the run reached the execution stage for this proposal.
    pub execution: Option<ExecutionOutcome>,
}

/// Aggregate counters over the run's items.
#[derive(Debug, Default, Serialize)]
pub struct AutoRunCounters {
    pub proposals: usize,
    pub approved: usize,
    pub executed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The whole invocation's result.
#[derive(Debug, Serialize)]
pub struct AutoRunReport {
    /// `"COMPLETED"`, or `"SKIPPED"` when the kill switch was off.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub counters: AutoRunCounters,
    pub items: Vec<AutoRunItem>,
}

impl AutoRunReport {
    fn kill_switch_off() -> Self {
        Self {
            outcome: "SKIPPED",
            reason: Some(REASON_KILL_SWITCH_OFF),
            counters: AutoRunCounters::default(),
            items: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// One control-loop invocation.
///
/// `config` is the caller's snapshot for the whole run; nothing here reads
/// the environment. The kill-switch check comes first and short-circuits
/// before any read or write.
pub async fn run(
    pool: &DbPool,
    event_bus: &EventBus,
    dispatcher: &dyn ActionDispatcher,
    config: &AutomationConfig,
    now: Timestamp,
) -> Result<AutoRunReport, sqlx::Error> {
    if !config.autorun_enabled {
        tracing::info!("Auto-run invoked with the kill switch off");
        return Ok(AutoRunReport::kill_switch_off());
    }

    let as_of = now.date_naive();
    let window = GenerationWindow {
        min_overdue_days: config.min_overdue_days,
        ticket_threshold_days: config.ticket_threshold_days,
    };

    // Candidate feeds → proposals.
    let invoices = InvoiceRepo::overdue_candidates(pool, window.min_overdue_days, as_of).await?;
    let tickets = TicketRepo::no_reply_candidates(pool, window.ticket_threshold_days, as_of).await?;
    let proposals = generate_proposals(&invoices, &tickets, &window, now);

    let policies = load_policy_lookup(pool).await?;

    let executor = Executor::new(
        pool,
        dispatcher,
        event_bus,
        ExecutorFlags {
            remind_invoice: config.remind_invoice_enabled,
            escalate_ticket: config.escalate_ticket_enabled,
            audit: config.executor_audit,
        },
    );

    // Budget counting starts at local midnight UTC.
    let day_start = as_of
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();

    let mut counters = AutoRunCounters {
        proposals: proposals.len(),
        ..Default::default()
    };
    let mut items = Vec::with_capacity(proposals.len());

    for proposal in &proposals {
        let item = process_proposal(
            pool,
            &executor,
            &policies,
            proposal,
            day_start,
            &mut counters,
        )
        .await?;
        items.push(item);
    }

    tracing::info!(
        proposals = counters.proposals,
        approved = counters.approved,
        executed = counters.executed,
        skipped = counters.skipped,
        failed = counters.failed,
        "Auto-run completed"
    );

    Ok(AutoRunReport {
        outcome: "COMPLETED",
        reason: None,
        counters,
        items,
    })
}

/// Load every policy into a per-kind lookup. The evaluator handles the
/// disabled case, so disabled policies stay in the map and produce
/// `POLICY_DISABLED` rather than looking absent.
pub async fn load_policy_lookup(
    pool: &DbPool,
) -> Result<HashMap<ProposalKind, PolicySnapshot>, sqlx::Error> {
    let mut lookup = HashMap::new();
    for row in PolicyRepo::list_all(pool).await? {
        let Some(kind) = row.kind() else {
            tracing::warn!(proposal_kind = %row.proposal_kind, "Ignoring policy for unknown proposal kind");
            continue;
        };
        match row.snapshot() {
            Ok(snapshot) => {
                lookup.insert(kind, snapshot);
            }
            Err(e) => {
                tracing::warn!(proposal_kind = %row.proposal_kind, error = %e, "Ignoring malformed policy");
            }
        }
    }
    Ok(lookup)
}

/// Decide, record, budget-check, and execute one proposal.
async fn process_proposal(
    pool: &DbPool,
    executor: &Executor<'_>,
    policies: &HashMap<ProposalKind, PolicySnapshot>,
    proposal: &Proposal,
    day_start: Timestamp,
    counters: &mut AutoRunCounters,
) -> Result<AutoRunItem, sqlx::Error> {
    let policy = policies.get(&proposal.kind);
    let verdict = policy::evaluate(proposal.severity, policy);

    let mut item = AutoRunItem {
        proposal_id: proposal.id.clone(),
        proposal_kind: proposal.kind.as_str(),
        target_id: proposal.target_id,
        severity: proposal.severity,
        decision: decisions::SKIPPED,
        decision_reason: verdict.reason,
        approval_id: None,
        execution: None,
    };

    if !verdict.can_auto_approve {
        // Expected configuration absence or safety gate: result-list entry
        // only, no approval row, no audit noise.
        counters.skipped += 1;
        return Ok(item);
    }

    // Ensure the approval exists; audit the creation only the first time.
    let (approval, created) = ApprovalRepo::insert_decision(
        pool,
        &CreateApproval {
            proposal_id: proposal.id.clone(),
            decision: domus_core::approval::DECISION_APPROVED.to_string(),
            decided_by: SYSTEM_ACTOR.to_string(),
            note: None,
            proposal_snapshot: proposal.snapshot(),
            proposal_hash: proposal.content_hash(),
        },
    )
    .await?;

    item.approval_id = Some(approval.id);

    if created {
        item.decision = decisions::AUTO_APPROVED;
        counters.approved += 1;
        AuditRepo::insert(
            pool,
            &CreateAudit {
                approval_id: approval.id,
                proposal_id: proposal.id.clone(),
                proposal_kind: proposal.kind.as_str().to_string(),
                action: actions::AUTO_APPROVED,
                actor_id: SYSTEM_ACTOR.to_string(),
                dry_run: false,
                result: None,
            },
        )
        .await?;
    } else if approval.is_approved() {
        item.decision = decisions::ALREADY_APPROVED;
        counters.approved += 1;
    } else {
        // An operator said no. The ledger wins; never execute.
        item.decision = decisions::ALREADY_REJECTED;
        counters.skipped += 1;
        return Ok(item);
    }

    if !verdict.can_auto_execute {
        item.execution = Some(ExecutionOutcome::skipped(
            REASON_AUTO_EXECUTE_DISABLED,
            json!(null),
        ));
        counters.skipped += 1;
        return Ok(item);
    }

    if approval.executed_at.is_some() {
        item.execution = Some(ExecutionOutcome::skipped("Already executed", json!(null)));
        counters.skipped += 1;
        return Ok(item);
    }

    // Daily budget, counted per proposal kind over today's audit rows.
    let policy = policy.expect("auto-approval implies a policy");
    let executed_today =
        AuditRepo::count_executed_since(pool, proposal.kind.as_str(), day_start).await?;
    if executed_today >= i64::from(policy.daily_limit) {
        AuditRepo::insert(
            pool,
            &CreateAudit {
                approval_id: approval.id,
                proposal_id: proposal.id.clone(),
                proposal_kind: proposal.kind.as_str().to_string(),
                action: actions::FAIL,
                actor_id: SYSTEM_ACTOR.to_string(),
                dry_run: false,
                result: Some(json!({
                    "reason": REASON_DAILY_LIMIT_EXCEEDED,
                    "executed_today": executed_today,
                    "daily_limit": policy.daily_limit,
                })),
            },
        )
        .await?;
        tracing::warn!(
            proposal_id = %proposal.id,
            executed_today,
            daily_limit = policy.daily_limit,
            "Daily execution budget exceeded"
        );
        item.execution = Some(ExecutionOutcome::failed(REASON_DAILY_LIMIT_EXCEEDED));
        counters.failed += 1;
        return Ok(item);
    }

    // Execute and record the outcome exactly once.
    let outcome = executor.execute(proposal, SYSTEM_ACTOR, false).await?;
    match outcome.status {
        ExecutionStatus::Executed => {
            if ApprovalRepo::mark_executed(pool, approval.id, &outcome.to_json())
                .await?
                .is_none()
            {
                // A concurrent run got there first; honor at-most-once.
                item.execution =
                    Some(ExecutionOutcome::skipped("Already executed", json!(null)));
                counters.skipped += 1;
                return Ok(item);
            }
            AuditRepo::insert(
                pool,
                &CreateAudit {
                    approval_id: approval.id,
                    proposal_id: proposal.id.clone(),
                    proposal_kind: proposal.kind.as_str().to_string(),
                    action: actions::AUTO_EXECUTED,
                    actor_id: SYSTEM_ACTOR.to_string(),
                    dry_run: false,
                    result: Some(outcome.to_json()),
                },
            )
            .await?;
            counters.executed += 1;
        }
        ExecutionStatus::Skipped => {
            AuditRepo::insert(
                pool,
                &CreateAudit {
                    approval_id: approval.id,
                    proposal_id: proposal.id.clone(),
                    proposal_kind: proposal.kind.as_str().to_string(),
                    action: actions::SKIP,
                    actor_id: SYSTEM_ACTOR.to_string(),
                    dry_run: false,
                    result: Some(outcome.to_json()),
                },
            )
            .await?;
            counters.skipped += 1;
        }
        ExecutionStatus::Failed => {
            counters.failed += 1;
        }
    }
    item.execution = Some(outcome);
    Ok(item)
}
