//! Execution-time precondition planning.
//!
//! Time passes between proposal generation, approval, and execution, so the
//! executor re-reads the live state of its target and decides again whether
//! the side effect is still warranted. That decision is pure and lives here;
//! the api layer does the reading and the acting. A missing or stale target
//! is an expected, recoverable outcome -- these functions return a skip, never
//! an error.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Skip reasons
// ---------------------------------------------------------------------------

pub const SKIP_FEATURE_DISABLED: &str = "Feature disabled";
pub const SKIP_INVOICE_NOT_FOUND: &str = "Invoice not found";
pub const SKIP_TICKET_NOT_FOUND: &str = "Ticket not found";
pub const SKIP_INVOICE_SETTLED: &str = "Already paid or not SENT";
pub const SKIP_TICKET_CLOSED: &str = "Ticket is closed";

/// Invoice status a reminder may still be sent for.
pub const INVOICE_STATUS_SENT: &str = "SENT";
/// Ticket status that blocks escalation.
pub const TICKET_STATUS_CLOSED: &str = "CLOSED";

// ---------------------------------------------------------------------------
// Live target state
// ---------------------------------------------------------------------------

/// The slice of an invoice row the executor re-validates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLiveState {
    pub status: String,
    pub paid_at: Option<Timestamp>,
}

impl InvoiceLiveState {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }
}

/// The slice of a ticket row the executor re-validates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLiveState {
    pub status: String,
    pub escalated_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// What the executor should do for one approved proposal.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionPlan {
    /// Preconditions hold; perform the side effect.
    Proceed,
    /// Withhold the side effect and record why, with the state observed now.
    Skip {
        reason: &'static str,
        current_state: serde_json::Value,
    },
}

/// Decide whether an invoice reminder should still go out.
pub fn plan_invoice_reminder(
    feature_enabled: bool,
    state: Option<&InvoiceLiveState>,
) -> ExecutionPlan {
    if !feature_enabled {
        return ExecutionPlan::Skip {
            reason: SKIP_FEATURE_DISABLED,
            current_state: json!(null),
        };
    }
    let Some(state) = state else {
        return ExecutionPlan::Skip {
            reason: SKIP_INVOICE_NOT_FOUND,
            current_state: json!(null),
        };
    };
    if state.status != INVOICE_STATUS_SENT || state.is_paid() {
        return ExecutionPlan::Skip {
            reason: SKIP_INVOICE_SETTLED,
            current_state: json!({
                "status": state.status,
                "paid_at": state.paid_at,
            }),
        };
    }
    ExecutionPlan::Proceed
}

/// Decide whether a ticket escalation should still happen.
pub fn plan_ticket_escalation(
    feature_enabled: bool,
    state: Option<&TicketLiveState>,
) -> ExecutionPlan {
    if !feature_enabled {
        return ExecutionPlan::Skip {
            reason: SKIP_FEATURE_DISABLED,
            current_state: json!(null),
        };
    }
    let Some(state) = state else {
        return ExecutionPlan::Skip {
            reason: SKIP_TICKET_NOT_FOUND,
            current_state: json!(null),
        };
    };
    if state.status == TICKET_STATUS_CLOSED {
        return ExecutionPlan::Skip {
            reason: SKIP_TICKET_CLOSED,
            current_state: json!({
                "status": state.status,
                "escalated_at": state.escalated_at,
            }),
        };
    }
    ExecutionPlan::Proceed
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Executed,
    Skipped,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Executed => "EXECUTED",
            ExecutionStatus::Skipped => "SKIPPED",
            ExecutionStatus::Failed => "FAILED",
        }
    }
}

/// What the executor did for one proposal, as persisted on the approval and
/// returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<serde_json::Value>,
}

impl ExecutionOutcome {
    pub fn executed() -> Self {
        Self {
            status: ExecutionStatus::Executed,
            reason: None,
            current_state: None,
        }
    }

    pub fn skipped(reason: impl Into<String>, current_state: serde_json::Value) -> Self {
        Self {
            status: ExecutionStatus::Skipped,
            reason: Some(reason.into()),
            current_state: Some(current_state),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            reason: Some(reason.into()),
            current_state: None,
        }
    }

    /// JSON form stored in `approvals.execute_result` and audit rows.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("outcome serialization cannot fail")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sent_invoice() -> InvoiceLiveState {
        InvoiceLiveState {
            status: "SENT".to_string(),
            paid_at: None,
        }
    }

    fn open_ticket() -> TicketLiveState {
        TicketLiveState {
            status: "OPEN".to_string(),
            escalated_at: None,
        }
    }

    #[test]
    fn sent_unpaid_invoice_proceeds() {
        assert_eq!(
            plan_invoice_reminder(true, Some(&sent_invoice())),
            ExecutionPlan::Proceed
        );
    }

    #[test]
    fn paid_invoice_skips_with_current_state() {
        let paid = InvoiceLiveState {
            status: "PAID".to_string(),
            paid_at: Some(chrono::Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()),
        };
        match plan_invoice_reminder(true, Some(&paid)) {
            ExecutionPlan::Skip {
                reason,
                current_state,
            } => {
                assert_eq!(reason, SKIP_INVOICE_SETTLED);
                assert_eq!(current_state["status"], "PAID");
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn non_sent_invoice_skips_even_when_unpaid() {
        let draft = InvoiceLiveState {
            status: "DRAFT".to_string(),
            paid_at: None,
        };
        match plan_invoice_reminder(true, Some(&draft)) {
            ExecutionPlan::Skip { reason, .. } => assert_eq!(reason, SKIP_INVOICE_SETTLED),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn missing_invoice_skips_not_errors() {
        match plan_invoice_reminder(true, None) {
            ExecutionPlan::Skip { reason, .. } => assert_eq!(reason, SKIP_INVOICE_NOT_FOUND),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn feature_flag_off_skips_before_state_is_considered() {
        match plan_invoice_reminder(false, Some(&sent_invoice())) {
            ExecutionPlan::Skip { reason, .. } => assert_eq!(reason, SKIP_FEATURE_DISABLED),
            other => panic!("expected skip, got {other:?}"),
        }
        match plan_ticket_escalation(false, Some(&open_ticket())) {
            ExecutionPlan::Skip { reason, .. } => assert_eq!(reason, SKIP_FEATURE_DISABLED),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn open_ticket_proceeds() {
        assert_eq!(
            plan_ticket_escalation(true, Some(&open_ticket())),
            ExecutionPlan::Proceed
        );
    }

    #[test]
    fn closed_ticket_skips_with_current_state() {
        let closed = TicketLiveState {
            status: "CLOSED".to_string(),
            escalated_at: None,
        };
        match plan_ticket_escalation(true, Some(&closed)) {
            ExecutionPlan::Skip {
                reason,
                current_state,
            } => {
                assert_eq!(reason, SKIP_TICKET_CLOSED);
                assert_eq!(current_state["status"], "CLOSED");
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn missing_ticket_skips_not_errors() {
        match plan_ticket_escalation(true, None) {
            ExecutionPlan::Skip { reason, .. } => assert_eq!(reason, SKIP_TICKET_NOT_FOUND),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn outcome_json_includes_reason_only_when_present() {
        let executed = ExecutionOutcome::executed().to_json();
        assert_eq!(executed["status"], "EXECUTED");
        assert!(executed.get("reason").is_none());

        let skipped =
            ExecutionOutcome::skipped(SKIP_TICKET_CLOSED, json!({"status": "CLOSED"})).to_json();
        assert_eq!(skipped["status"], "SKIPPED");
        assert_eq!(skipped["reason"], SKIP_TICKET_CLOSED);
        assert_eq!(skipped["current_state"]["status"], "CLOSED");
    }
}
