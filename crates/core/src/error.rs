//! Domain error taxonomy shared by the db and api layers.
//!
//! Only genuine failures live here. Withheld automation, stale targets, and
//! spent budgets are expected outcomes and travel as data, not errors.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced row does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Input or stored data failed a domain rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation collides with existing state (e.g. a second decision
    /// for the same proposal identity).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No acceptable operator identity was presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The operator is known but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A bug or broken invariant; details belong in the logs.
    #[error("Internal error: {0}")]
    Internal(String),
}
