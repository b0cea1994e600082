//! Repository for the `invoices` table and the reminder outbox.
//!
//! The candidate feed and the live-state read are the engine's read-only
//! window into billing; `queue_reminder` is the one narrow side effect the
//! billing subsystem exposes to it.

use chrono::NaiveDate;
use domus_core::execution::InvoiceLiveState;
use domus_core::proposal::OverdueInvoiceCandidate;
use domus_core::types::DbId;
use sqlx::PgPool;

use crate::models::invoice::{InvoiceStateRow, OverdueInvoiceRow};

pub struct InvoiceRepo;

impl InvoiceRepo {
    /// The overdue-invoice candidate feed.
    ///
    /// Deterministic for a given `(min_overdue_days, as_of)` pair: invoices
    /// with status `SENT`, unpaid, at least `min_overdue_days` past due,
    /// ordered by id.
    pub async fn overdue_candidates(
        pool: &PgPool,
        min_overdue_days: i64,
        as_of: NaiveDate,
    ) -> Result<Vec<OverdueInvoiceCandidate>, sqlx::Error> {
        let rows = sqlx::query_as::<_, OverdueInvoiceRow>(
            "SELECT id AS invoice_id, tenant_id, room_id, period_month,
                    ($2::date - due_date)::BIGINT AS overdue_days,
                    reminder_count
             FROM invoices
             WHERE status = 'SENT'
               AND paid_at IS NULL
               AND ($2::date - due_date) >= $1
             ORDER BY id ASC",
        )
        .bind(min_overdue_days)
        .bind(as_of)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Re-read the live status of one invoice at execution time.
    pub async fn live_state(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InvoiceLiveState>, sqlx::Error> {
        let row = sqlx::query_as::<_, InvoiceStateRow>(
            "SELECT status, paid_at FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Queue a payment reminder for the invoice's tenant.
    ///
    /// Enqueues an outbox row and bumps `reminder_count` in one transaction.
    /// Returns `false` when the invoice no longer exists; delivery itself is
    /// owned by the downstream dispatch worker.
    pub async fn queue_reminder(pool: &PgPool, invoice_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tenant_id: Option<DbId> =
            sqlx::query_scalar("SELECT tenant_id FROM invoices WHERE id = $1 FOR UPDATE")
                .bind(invoice_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(tenant_id) = tenant_id else {
            return Ok(false);
        };

        sqlx::query("INSERT INTO reminder_outbox (invoice_id, tenant_id) VALUES ($1, $2)")
            .bind(invoice_id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE invoices SET reminder_count = reminder_count + 1 WHERE id = $1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
