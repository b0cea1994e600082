//! Audit action and actor constants shared by the orchestrator, the manual
//! execution path, and the metrics report.

/// Known actions for automation audit entries.
pub mod actions {
    /// The system created the approval row.
    pub const AUTO_APPROVED: &str = "AUTO_APPROVED";
    /// The executor performed the side effect.
    pub const AUTO_EXECUTED: &str = "AUTO_EXECUTED";
    /// Execution was withheld on purpose (stale target, feature off).
    pub const SKIP: &str = "SKIP";
    /// An operational limit was hit; surfaced in metrics.
    pub const FAIL: &str = "FAIL";
}

/// All valid audit actions, in display order.
pub const VALID_ACTIONS: &[&str] = &[
    actions::AUTO_APPROVED,
    actions::AUTO_EXECUTED,
    actions::SKIP,
    actions::FAIL,
];

/// Actor recorded for decisions the engine makes on its own.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// Reason recorded on the `FAIL` audit row when the daily budget is spent.
pub const REASON_DAILY_LIMIT_EXCEEDED: &str = "DAILY_LIMIT_EXCEEDED";

/// Outcome of an auto-run invocation that never started: kill switch off.
pub const REASON_KILL_SWITCH_OFF: &str = "KILL_SWITCH_OFF";
