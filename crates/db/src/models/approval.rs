//! Approval ledger models.

use domus_core::types::{DbId, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `approvals` table: the one durable decision for a proposal
/// identity, updated exactly once more when execution results are attached.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Approval {
    pub id: DbId,
    pub proposal_id: ProposalId,
    pub decision: String,
    /// Operator id as text, or `"SYSTEM"`.
    pub decided_by: String,
    pub decided_at: Timestamp,
    pub note: Option<String>,
    pub proposal_snapshot: serde_json::Value,
    pub proposal_hash: String,
    pub executed_at: Option<Timestamp>,
    pub execute_result: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Approval {
    pub fn is_approved(&self) -> bool {
        self.decision == domus_core::approval::DECISION_APPROVED
    }
}

/// DTO for inserting a decision. The snapshot and hash are stored for every
/// decision, rejections included, so the ledger is self-describing.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApproval {
    pub proposal_id: ProposalId,
    pub decision: String,
    pub decided_by: String,
    pub note: Option<String>,
    pub proposal_snapshot: serde_json::Value,
    pub proposal_hash: String,
}
