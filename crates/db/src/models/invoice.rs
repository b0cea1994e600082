//! Invoice models: the engine's read-only view of the billing subsystem.

use domus_core::execution::InvoiceLiveState;
use domus_core::proposal::OverdueInvoiceCandidate;
use domus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `invoices` table (engine-relevant columns only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub tenant_id: DbId,
    pub room_id: DbId,
    pub period_month: String,
    pub status: String,
    pub due_date: chrono::NaiveDate,
    pub paid_at: Option<Timestamp>,
    pub reminder_count: i32,
    pub created_at: Timestamp,
}

/// Row shape of the overdue-invoice candidate feed query.
#[derive(Debug, Clone, FromRow)]
pub struct OverdueInvoiceRow {
    pub invoice_id: DbId,
    pub tenant_id: DbId,
    pub room_id: DbId,
    pub period_month: String,
    pub overdue_days: i64,
    pub reminder_count: i32,
}

impl From<OverdueInvoiceRow> for OverdueInvoiceCandidate {
    fn from(row: OverdueInvoiceRow) -> Self {
        OverdueInvoiceCandidate {
            invoice_id: row.invoice_id,
            tenant_id: row.tenant_id,
            room_id: row.room_id,
            period_month: row.period_month,
            overdue_days: row.overdue_days,
            reminder_count: row.reminder_count,
        }
    }
}

/// Row shape of the execution-time status re-read.
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceStateRow {
    pub status: String,
    pub paid_at: Option<Timestamp>,
}

impl From<InvoiceStateRow> for InvoiceLiveState {
    fn from(row: InvoiceStateRow) -> Self {
        InvoiceLiveState {
            status: row.status,
            paid_at: row.paid_at,
        }
    }
}
