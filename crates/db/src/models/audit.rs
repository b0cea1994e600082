//! Automation audit trail models.

use domus_core::types::{DbId, ProposalId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `automation_audit` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AutomationAudit {
    pub id: DbId,
    pub approval_id: DbId,
    pub proposal_id: ProposalId,
    pub proposal_kind: String,
    pub action: String,
    pub actor_id: String,
    pub dry_run: bool,
    pub result: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for appending one audit entry.
#[derive(Debug, Clone)]
pub struct CreateAudit {
    pub approval_id: DbId,
    pub proposal_id: ProposalId,
    pub proposal_kind: String,
    pub action: &'static str,
    pub actor_id: String,
    pub dry_run: bool,
    pub result: Option<serde_json::Value>,
}

/// One cell of the per-kind activity aggregation used by the metrics report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityCount {
    pub proposal_kind: String,
    pub action: String,
    pub count: i64,
}
