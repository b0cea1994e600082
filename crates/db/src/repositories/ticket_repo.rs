//! Repository for the `tickets` table.

use chrono::NaiveDate;
use domus_core::execution::TicketLiveState;
use domus_core::proposal::NoReplyTicketCandidate;
use domus_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{NoReplyTicketRow, TicketStateRow};

pub struct TicketRepo;

impl TicketRepo {
    /// The no-reply-ticket candidate feed.
    ///
    /// Deterministic for a given `(threshold_days, as_of)` pair: open
    /// tickets with no staff reply, open at least `threshold_days`, ordered
    /// by id.
    pub async fn no_reply_candidates(
        pool: &PgPool,
        threshold_days: i64,
        as_of: NaiveDate,
    ) -> Result<Vec<NoReplyTicketCandidate>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NoReplyTicketRow>(
            "SELECT id AS ticket_id,
                    ($2::date - created_at::date)::BIGINT AS days_open,
                    last_reply_at
             FROM tickets
             WHERE status <> 'CLOSED'
               AND last_reply_at IS NULL
               AND ($2::date - created_at::date) >= $1
             ORDER BY id ASC",
        )
        .bind(threshold_days)
        .bind(as_of)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Re-read the live status of one ticket at execution time.
    pub async fn live_state(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TicketLiveState>, sqlx::Error> {
        let row = sqlx::query_as::<_, TicketStateRow>(
            "SELECT status, escalated_at FROM tickets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Escalate one ticket: raise its priority and stamp `escalated_at`.
    ///
    /// Returns `false` when the ticket is gone or already closed -- the
    /// executor treats both as a skip, not a failure.
    pub async fn escalate(pool: &PgPool, ticket_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets
             SET priority = 'URGENT', escalated_at = now()
             WHERE id = $1 AND status <> 'CLOSED'",
        )
        .bind(ticket_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
