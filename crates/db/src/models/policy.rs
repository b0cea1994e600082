//! Automation policy models.

use domus_core::error::CoreError;
use domus_core::policy::PolicySnapshot;
use domus_core::proposal::ProposalKind;
use domus_core::severity::AutoApproveCeiling;
use domus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `automation_policies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AutomationPolicy {
    pub id: DbId,
    pub proposal_kind: String,
    pub max_severity: String,
    pub auto_approve: bool,
    pub auto_execute: bool,
    pub daily_limit: i32,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AutomationPolicy {
    /// The proposal kind this policy governs, if the stored value is known.
    pub fn kind(&self) -> Option<ProposalKind> {
        ProposalKind::parse(&self.proposal_kind)
    }

    /// Convert to the storage-independent view the evaluator consumes.
    ///
    /// A stored ceiling outside LOW/MEDIUM is a data error (the schema also
    /// forbids it), never a wider ceiling.
    pub fn snapshot(&self) -> Result<PolicySnapshot, CoreError> {
        Ok(PolicySnapshot {
            enabled: self.enabled,
            max_severity: AutoApproveCeiling::parse(&self.max_severity)?,
            auto_approve: self.auto_approve,
            auto_execute: self.auto_execute,
            daily_limit: self.daily_limit,
        })
    }
}

/// DTO for creating or replacing a policy (seeds and tests; the admin CRUD
/// surface lives outside this subsystem).
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPolicy {
    pub proposal_kind: ProposalKind,
    pub max_severity: AutoApproveCeiling,
    pub auto_approve: bool,
    pub auto_execute: bool,
    pub daily_limit: i32,
    pub enabled: bool,
}
