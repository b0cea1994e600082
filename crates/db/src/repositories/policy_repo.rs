//! Repository for the `automation_policies` table.

use sqlx::PgPool;

use crate::models::policy::{AutomationPolicy, UpsertPolicy};

/// Column list for automation_policies queries.
const COLUMNS: &str = "id, proposal_kind, max_severity, auto_approve, auto_execute, \
    daily_limit, enabled, created_at, updated_at";

/// Read access for the engine plus the upsert used by seeds and tests.
pub struct PolicyRepo;

impl PolicyRepo {
    /// Find the policy governing one proposal kind.
    pub async fn find_by_kind(
        pool: &PgPool,
        proposal_kind: &str,
    ) -> Result<Option<AutomationPolicy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM automation_policies WHERE proposal_kind = $1");
        sqlx::query_as::<_, AutomationPolicy>(&query)
            .bind(proposal_kind)
            .fetch_optional(pool)
            .await
    }

    /// List all policies, enabled or not (the metrics report surfaces
    /// disabled-but-configured policies).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AutomationPolicy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM automation_policies ORDER BY proposal_kind");
        sqlx::query_as::<_, AutomationPolicy>(&query)
            .fetch_all(pool)
            .await
    }

    /// List enabled policies only, for the orchestrator's per-kind lookup.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<AutomationPolicy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM automation_policies WHERE enabled = TRUE ORDER BY proposal_kind"
        );
        sqlx::query_as::<_, AutomationPolicy>(&query)
            .fetch_all(pool)
            .await
    }

    /// Create or replace the policy for a proposal kind.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertPolicy,
    ) -> Result<AutomationPolicy, sqlx::Error> {
        let query = format!(
            "INSERT INTO automation_policies
                (proposal_kind, max_severity, auto_approve, auto_execute, daily_limit, enabled)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (proposal_kind) DO UPDATE SET
                max_severity = EXCLUDED.max_severity,
                auto_approve = EXCLUDED.auto_approve,
                auto_execute = EXCLUDED.auto_execute,
                daily_limit = EXCLUDED.daily_limit,
                enabled = EXCLUDED.enabled,
                updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AutomationPolicy>(&query)
            .bind(input.proposal_kind.as_str())
            .bind(input.max_severity.as_str())
            .bind(input.auto_approve)
            .bind(input.auto_execute)
            .bind(input.daily_limit)
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }
}
