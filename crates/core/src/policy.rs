//! Policy evaluation: may this proposal be approved and executed without a
//! human?
//!
//! The evaluator is a pure decision function over one proposal and the policy
//! configured for its kind. It never touches storage; the orchestrator loads
//! policies up front and passes snapshots in. The hard severity ceiling is
//! enforced here in addition to being structural in
//! [`AutoApproveCeiling`](crate::severity::AutoApproveCeiling): a HIGH or
//! CRITICAL proposal is never auto-approvable, whatever the policy says.

use serde::{Deserialize, Serialize};

use crate::severity::{AutoApproveCeiling, Severity};

// ---------------------------------------------------------------------------
// Reason codes
// ---------------------------------------------------------------------------

/// No policy row exists for the proposal kind.
pub const REASON_NO_POLICY: &str = "NO_POLICY";
/// A policy exists but is disabled.
pub const REASON_POLICY_DISABLED: &str = "POLICY_DISABLED";
/// Proposal severity is above the hard ceiling or the policy ceiling.
pub const REASON_SEVERITY_EXCEEDS_POLICY: &str = "SEVERITY_EXCEEDS_POLICY";
/// The policy does not allow automatic approval.
pub const REASON_AUTO_APPROVE_DISABLED: &str = "AUTO_APPROVE_DISABLED";
/// Approval is automatic but execution is left to a human.
pub const REASON_AUTO_EXECUTE_DISABLED: &str = "AUTO_EXECUTE_DISABLED";

// ---------------------------------------------------------------------------
// Policy snapshot
// ---------------------------------------------------------------------------

/// The storage-independent view of one policy row, as the evaluator sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub enabled: bool,
    pub max_severity: AutoApproveCeiling,
    pub auto_approve: bool,
    pub auto_execute: bool,
    pub daily_limit: i32,
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// The evaluator's answer for one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyVerdict {
    pub can_auto_approve: bool,
    pub can_auto_execute: bool,
    /// Why automation was withheld; `None` when fully automatic.
    pub reason: Option<&'static str>,
}

impl PolicyVerdict {
    fn withheld(reason: &'static str) -> Self {
        Self {
            can_auto_approve: false,
            can_auto_execute: false,
            reason: Some(reason),
        }
    }
}

/// Evaluate one proposal's severity against the policy for its kind.
///
/// Rules apply in order: missing policy, disabled policy, severity gate
/// (hard ceiling first, then the configured ceiling), auto-approve flag.
/// `can_auto_execute` is only derived once auto-approval is allowed, gated
/// additionally by the policy's `auto_execute` flag.
pub fn evaluate(severity: Severity, policy: Option<&PolicySnapshot>) -> PolicyVerdict {
    let Some(policy) = policy else {
        return PolicyVerdict::withheld(REASON_NO_POLICY);
    };

    if !policy.enabled {
        return PolicyVerdict::withheld(REASON_POLICY_DISABLED);
    }

    // The hard ceiling: HIGH and CRITICAL are never automatic. The configured
    // ceiling can only tighten this further, to LOW.
    if severity > Severity::Medium || severity > policy.max_severity.as_severity() {
        return PolicyVerdict::withheld(REASON_SEVERITY_EXCEEDS_POLICY);
    }

    if !policy.auto_approve {
        return PolicyVerdict::withheld(REASON_AUTO_APPROVE_DISABLED);
    }

    if !policy.auto_execute {
        return PolicyVerdict {
            can_auto_approve: true,
            can_auto_execute: false,
            reason: Some(REASON_AUTO_EXECUTE_DISABLED),
        };
    }

    PolicyVerdict {
        can_auto_approve: true,
        can_auto_execute: true,
        reason: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
