//! The executor: perform the side effect for one approved proposal, after
//! re-validating its target's live state.
//!
//! Time passes between approval and execution, so every run re-reads the
//! target and plans again (`domus_core::execution`). In dry-run mode the
//! plan is computed against live state but no side effect happens and
//! nothing is written -- the pure read path behind the preview endpoint.

use serde_json::json;

use domus_core::execution::{
    plan_invoice_reminder, plan_ticket_escalation, ExecutionOutcome, ExecutionPlan,
    SKIP_INVOICE_NOT_FOUND, SKIP_TICKET_NOT_FOUND,
};
use domus_core::proposal::{Proposal, ProposalKind};
use domus_db::repositories::{InvoiceRepo, TicketRepo};
use domus_db::DbPool;
use domus_events::{ActivityEvent, EventBus};

use crate::engine::dispatch::ActionDispatcher;

/// Feature-flag set governing what the executor may do.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorFlags {
    pub remind_invoice: bool,
    pub escalate_ticket: bool,
    /// When on, every branch publishes a fire-and-forget activity event.
    pub audit: bool,
}

/// Executes one approved proposal against the live state of its target.
pub struct Executor<'a> {
    pool: &'a DbPool,
    dispatcher: &'a dyn ActionDispatcher,
    event_bus: &'a EventBus,
    flags: ExecutorFlags,
}

impl<'a> Executor<'a> {
    pub fn new(
        pool: &'a DbPool,
        dispatcher: &'a dyn ActionDispatcher,
        event_bus: &'a EventBus,
        flags: ExecutorFlags,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            event_bus,
            flags,
        }
    }

    /// Run one proposal. Returns the outcome; storage errors propagate
    /// (infrastructure), stale or missing targets do not (expected skips).
    pub async fn execute(
        &self,
        proposal: &Proposal,
        actor: &str,
        dry_run: bool,
    ) -> Result<ExecutionOutcome, sqlx::Error> {
        let outcome = match proposal.kind {
            ProposalKind::RemindInvoice => self.remind_invoice(proposal, dry_run).await?,
            ProposalKind::EscalateTicket => self.escalate_ticket(proposal, dry_run).await?,
        };

        if self.flags.audit {
            self.publish_activity(proposal, actor, dry_run, &outcome);
        }

        Ok(outcome)
    }

    async fn remind_invoice(
        &self,
        proposal: &Proposal,
        dry_run: bool,
    ) -> Result<ExecutionOutcome, sqlx::Error> {
        let state = InvoiceRepo::live_state(self.pool, proposal.target_id).await?;
        match plan_invoice_reminder(self.flags.remind_invoice, state.as_ref()) {
            ExecutionPlan::Skip {
                reason,
                current_state,
            } => Ok(ExecutionOutcome::skipped(reason, current_state)),
            ExecutionPlan::Proceed => {
                if dry_run {
                    return Ok(ExecutionOutcome::executed());
                }
                if self
                    .dispatcher
                    .queue_invoice_reminder(proposal.target_id)
                    .await?
                {
                    Ok(ExecutionOutcome::executed())
                } else {
                    // Vanished between the state read and the dispatch.
                    Ok(ExecutionOutcome::skipped(SKIP_INVOICE_NOT_FOUND, json!(null)))
                }
            }
        }
    }

    async fn escalate_ticket(
        &self,
        proposal: &Proposal,
        dry_run: bool,
    ) -> Result<ExecutionOutcome, sqlx::Error> {
        let state = TicketRepo::live_state(self.pool, proposal.target_id).await?;
        match plan_ticket_escalation(self.flags.escalate_ticket, state.as_ref()) {
            ExecutionPlan::Skip {
                reason,
                current_state,
            } => Ok(ExecutionOutcome::skipped(reason, current_state)),
            ExecutionPlan::Proceed => {
                if dry_run {
                    return Ok(ExecutionOutcome::executed());
                }
                if self.dispatcher.escalate_ticket(proposal.target_id).await? {
                    Ok(ExecutionOutcome::executed())
                } else {
                    Ok(ExecutionOutcome::skipped(SKIP_TICKET_NOT_FOUND, json!(null)))
                }
            }
        }
    }

    /// Best-effort activity event describing what the executor just did.
    /// Distinct from the primary audit ledger; dropping it is acceptable.
    fn publish_activity(
        &self,
        proposal: &Proposal,
        actor: &str,
        dry_run: bool,
        outcome: &ExecutionOutcome,
    ) {
        let (event_type, entity_type) = match proposal.kind {
            ProposalKind::RemindInvoice => ("automation.invoice_reminder", "invoice"),
            ProposalKind::EscalateTicket => ("automation.ticket_escalation", "ticket"),
        };

        self.event_bus.publish(
            ActivityEvent::new(event_type)
                .with_source(entity_type, proposal.target_id)
                .with_actor(actor)
                .with_payload(json!({
                    "proposal_id": proposal.id,
                    "outcome": outcome.to_json(),
                    "dry_run": dry_run,
                })),
        );
    }
}
