//! Proposal severity levels and the day-count step functions that assign them.
//!
//! Severity is ordered (`Low < Medium < High < Critical`) and assignment is
//! monotonic in the day count: more days overdue or open never lowers the
//! severity. The auto-approval ceiling is a separate two-variant type so that
//! `High` and `Critical` are unrepresentable as a configured ceiling.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How urgent a proposal is, derived from how long the fact has persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Auto-approval ceiling
// ---------------------------------------------------------------------------

/// The highest severity a policy may allow for automatic approval.
///
/// Deliberately not [`Severity`]: an admin can configure `LOW` or `MEDIUM`
/// and nothing else, so `HIGH`/`CRITICAL` proposals can never be
/// auto-approved no matter what is stored in the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoApproveCeiling {
    Low,
    Medium,
}

impl AutoApproveCeiling {
    pub fn as_str(self) -> &'static str {
        match self {
            AutoApproveCeiling::Low => "LOW",
            AutoApproveCeiling::Medium => "MEDIUM",
        }
    }

    /// The [`Severity`] this ceiling admits up to.
    pub fn as_severity(self) -> Severity {
        match self {
            AutoApproveCeiling::Low => Severity::Low,
            AutoApproveCeiling::Medium => Severity::Medium,
        }
    }

    /// Parse the stored column value. Anything outside `LOW`/`MEDIUM` is a
    /// data error, not a higher ceiling.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "LOW" => Ok(AutoApproveCeiling::Low),
            "MEDIUM" => Ok(AutoApproveCeiling::Medium),
            other => Err(CoreError::Validation(format!(
                "Invalid auto-approve ceiling '{other}'. Must be LOW or MEDIUM"
            ))),
        }
    }
}

impl std::fmt::Display for AutoApproveCeiling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step functions
// ---------------------------------------------------------------------------

/// Severity of an overdue-invoice proposal from the number of days overdue.
pub fn severity_for_overdue_days(overdue_days: i64) -> Severity {
    if overdue_days < 7 {
        Severity::Low
    } else if overdue_days < 14 {
        Severity::Medium
    } else if overdue_days < 30 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Severity of a no-reply-ticket proposal from the number of days open.
pub fn severity_for_days_open(days_open: i64) -> Severity {
    if days_open < 5 {
        Severity::Low
    } else if days_open < 10 {
        Severity::Medium
    } else if days_open < 21 {
        Severity::High
    } else {
        Severity::Critical
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
