//! Repository for the append-only `automation_audit` table.

use domus_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::audit::{ActivityCount, AutomationAudit, CreateAudit};

/// Column list for automation_audit queries.
const COLUMNS: &str = "id, approval_id, proposal_id, proposal_kind, action, \
    actor_id, dry_run, result, created_at";

/// Provides append and aggregation operations for the audit trail.
/// There is deliberately no update or delete here.
pub struct AuditRepo;

impl AuditRepo {
    /// Append one audit entry.
    pub async fn insert(pool: &PgPool, input: &CreateAudit) -> Result<AutomationAudit, sqlx::Error> {
        let query = format!(
            "INSERT INTO automation_audit
                (approval_id, proposal_id, proposal_kind, action, actor_id, dry_run, result)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AutomationAudit>(&query)
            .bind(input.approval_id)
            .bind(&input.proposal_id)
            .bind(&input.proposal_kind)
            .bind(input.action)
            .bind(&input.actor_id)
            .bind(input.dry_run)
            .bind(&input.result)
            .fetch_one(pool)
            .await
    }

    /// Count real (non-dry-run) `AUTO_EXECUTED` entries for one proposal kind
    /// since the given instant. This is the daily-budget counter.
    pub async fn count_executed_since(
        pool: &PgPool,
        proposal_kind: &str,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM automation_audit
             WHERE proposal_kind = $1
               AND action = 'AUTO_EXECUTED'
               AND dry_run = FALSE
               AND created_at >= $2",
        )
        .bind(proposal_kind)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Per-kind, per-action activity counts since the given instant, for the
    /// metrics report.
    pub async fn activity_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<ActivityCount>, sqlx::Error> {
        sqlx::query_as::<_, ActivityCount>(
            "SELECT proposal_kind, action, COUNT(*)::BIGINT AS count
             FROM automation_audit
             WHERE created_at >= $1 AND dry_run = FALSE
             GROUP BY proposal_kind, action
             ORDER BY proposal_kind, action",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// All audit entries for one approval, oldest first.
    pub async fn list_for_approval(
        pool: &PgPool,
        approval_id: DbId,
    ) -> Result<Vec<AutomationAudit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM automation_audit
             WHERE approval_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, AutomationAudit>(&query)
            .bind(approval_id)
            .fetch_all(pool)
            .await
    }
}
