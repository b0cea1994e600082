//! Approval decision constants and validation.
//!
//! The valid decision values for the approval ledger, used by both the db
//! and api layers. A decision is made exactly once per proposal identity,
//! by an operator or by the system.

use crate::error::CoreError;

/// The proposal may be carried out.
pub const DECISION_APPROVED: &str = "APPROVED";

/// The proposal must not be carried out.
pub const DECISION_REJECTED: &str = "REJECTED";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[DECISION_APPROVED, DECISION_REJECTED];

/// Validate that a decision string is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), CoreError> {
    if VALID_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid decision '{decision}'. Must be one of: {}",
            VALID_DECISIONS.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_decisions_accepted() {
        assert!(validate_decision(DECISION_APPROVED).is_ok());
        assert!(validate_decision(DECISION_REJECTED).is_ok());
    }

    #[test]
    fn invalid_decision_rejected() {
        assert!(validate_decision("FLAGGED").is_err());
        assert!(validate_decision("approved").is_err());
        assert!(validate_decision("").is_err());
    }
}
