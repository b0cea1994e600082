//! Operational guardrail assessment for the metrics report.
//!
//! A read-only health view over the pipeline: given a policy and its recent
//! audit activity, classify how close the automation is to its limits. This
//! is reporting, not a control path -- nothing here gates execution.

use serde::Serialize;

use crate::policy::PolicySnapshot;

// ---------------------------------------------------------------------------
// Guardrail state
// ---------------------------------------------------------------------------

/// Health classification of one policy, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardrailState {
    /// A policy row exists but is switched off.
    Disabled,
    /// Today's executions have consumed the whole daily budget.
    AtLimit,
    /// Today's executions are at or past 80% of the daily budget.
    NearLimit,
    /// Enabled but with zero audit activity in the reporting window.
    Idle,
    Healthy,
}

impl GuardrailState {
    pub fn as_str(self) -> &'static str {
        match self {
            GuardrailState::Disabled => "DISABLED",
            GuardrailState::AtLimit => "AT_LIMIT",
            GuardrailState::NearLimit => "NEAR_LIMIT",
            GuardrailState::Idle => "IDLE",
            GuardrailState::Healthy => "HEALTHY",
        }
    }
}

/// Classify one policy from today's execution count and the window's total
/// audit activity.
pub fn assess(policy: &PolicySnapshot, executed_today: i64, window_activity: i64) -> GuardrailState {
    if !policy.enabled {
        return GuardrailState::Disabled;
    }
    let limit = i64::from(policy.daily_limit);
    if executed_today >= limit {
        return GuardrailState::AtLimit;
    }
    // 80% threshold without floating point: today/limit >= 4/5.
    if limit > 0 && executed_today * 5 >= limit * 4 {
        return GuardrailState::NearLimit;
    }
    if window_activity == 0 {
        return GuardrailState::Idle;
    }
    GuardrailState::Healthy
}

// ---------------------------------------------------------------------------
// Activity summary
// ---------------------------------------------------------------------------

/// Per-kind audit activity over the reporting window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub approved: i64,
    pub executed: i64,
    pub skipped: i64,
    pub failed: i64,
}

impl ActivitySummary {
    pub fn total(&self) -> i64 {
        self.approved + self.executed + self.skipped + self.failed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::AutoApproveCeiling;

    fn policy(enabled: bool, daily_limit: i32) -> PolicySnapshot {
        PolicySnapshot {
            enabled,
            max_severity: AutoApproveCeiling::Medium,
            auto_approve: true,
            auto_execute: true,
            daily_limit,
        }
    }

    #[test]
    fn disabled_policy_wins_over_everything() {
        assert_eq!(
            assess(&policy(false, 10), 10, 100),
            GuardrailState::Disabled
        );
    }

    #[test]
    fn at_limit_when_budget_spent() {
        assert_eq!(assess(&policy(true, 10), 10, 50), GuardrailState::AtLimit);
        assert_eq!(assess(&policy(true, 10), 12, 50), GuardrailState::AtLimit);
    }

    #[test]
    fn zero_limit_is_always_at_limit() {
        assert_eq!(assess(&policy(true, 0), 0, 5), GuardrailState::AtLimit);
    }

    #[test]
    fn near_limit_at_eighty_percent() {
        assert_eq!(assess(&policy(true, 10), 8, 50), GuardrailState::NearLimit);
        assert_eq!(assess(&policy(true, 10), 9, 50), GuardrailState::NearLimit);
        assert_eq!(assess(&policy(true, 5), 4, 50), GuardrailState::NearLimit);
    }

    #[test]
    fn below_eighty_percent_is_not_near() {
        assert_eq!(assess(&policy(true, 10), 7, 50), GuardrailState::Healthy);
    }

    #[test]
    fn idle_when_enabled_with_no_activity() {
        assert_eq!(assess(&policy(true, 10), 0, 0), GuardrailState::Idle);
    }

    #[test]
    fn healthy_otherwise() {
        assert_eq!(assess(&policy(true, 10), 2, 14), GuardrailState::Healthy);
    }

    #[test]
    fn summary_total_sums_all_actions() {
        let summary = ActivitySummary {
            approved: 3,
            executed: 2,
            skipped: 4,
            failed: 1,
        };
        assert_eq!(summary.total(), 10);
        assert_eq!(ActivitySummary::default().total(), 0);
    }
}
