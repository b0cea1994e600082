//! Repository for the `approvals` table -- the decision ledger.

use domus_core::types::DbId;
use sqlx::PgPool;

use crate::models::approval::{Approval, CreateApproval};

/// Column list for approvals queries.
const COLUMNS: &str = "id, proposal_id, decision, decided_by, decided_at, note, \
    proposal_snapshot, proposal_hash, executed_at, execute_result, created_at, updated_at";

/// Provides ledger operations for approval decisions.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Conflict-tolerant insert used by the automatic path.
    ///
    /// Inserts the decision if no decision exists for the proposal identity;
    /// otherwise returns the existing row untouched. The returned flag is
    /// `true` only when this call created the row, which is what gates the
    /// `AUTO_APPROVED` audit entry on repeated runs.
    pub async fn insert_decision(
        pool: &PgPool,
        input: &CreateApproval,
    ) -> Result<(Approval, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO approvals
                (proposal_id, decision, decided_by, note, proposal_snapshot, proposal_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (proposal_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Approval>(&query)
            .bind(&input.proposal_id)
            .bind(&input.decision)
            .bind(&input.decided_by)
            .bind(&input.note)
            .bind(&input.proposal_snapshot)
            .bind(&input.proposal_hash)
            .fetch_optional(pool)
            .await?;

        if let Some(approval) = inserted {
            return Ok((approval, true));
        }

        // Lost the insert to an earlier decision; approvals are never
        // deleted, so the row must exist.
        let existing = Self::find_by_proposal_id(pool, &input.proposal_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((existing, false))
    }

    /// Strict insert used by the manual path. A second decision for the same
    /// proposal violates `uq_approvals_proposal_id`, which the api layer
    /// surfaces as a conflict.
    pub async fn insert_manual(
        pool: &PgPool,
        input: &CreateApproval,
    ) -> Result<Approval, sqlx::Error> {
        let query = format!(
            "INSERT INTO approvals
                (proposal_id, decision, decided_by, note, proposal_snapshot, proposal_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(&input.proposal_id)
            .bind(&input.decision)
            .bind(&input.decided_by)
            .bind(&input.note)
            .bind(&input.proposal_snapshot)
            .bind(&input.proposal_hash)
            .fetch_one(pool)
            .await
    }

    /// Attach execution results, at most once.
    ///
    /// The `executed_at IS NULL` guard makes execution recording idempotent:
    /// the first caller gets the updated row back, every later caller gets
    /// `None` and must treat the approval as already executed.
    pub async fn mark_executed(
        pool: &PgPool,
        id: DbId,
        execute_result: &serde_json::Value,
    ) -> Result<Option<Approval>, sqlx::Error> {
        let query = format!(
            "UPDATE approvals
             SET executed_at = now(), execute_result = $2, updated_at = now()
             WHERE id = $1 AND executed_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(id)
            .bind(execute_result)
            .fetch_optional(pool)
            .await
    }

    /// Find an approval by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Approval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approvals WHERE id = $1");
        sqlx::query_as::<_, Approval>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the decision for a proposal identity.
    pub async fn find_by_proposal_id(
        pool: &PgPool,
        proposal_id: &str,
    ) -> Result<Option<Approval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approvals WHERE proposal_id = $1");
        sqlx::query_as::<_, Approval>(&query)
            .bind(proposal_id)
            .fetch_optional(pool)
            .await
    }

    /// List recent decisions, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Approval>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approvals
             ORDER BY decided_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(limit.min(500))
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
