//! The narrow side-effecting operations collaborators expose to the engine.
//!
//! The executor never manipulates invoice or ticket schemas itself; it asks
//! the owning subsystem to act through this trait. The Postgres
//! implementation enqueues a reminder-outbox row (delivery, retries, and
//! backoff are owned by the downstream dispatch worker) and flips the
//! ticket's escalation fields.

use async_trait::async_trait;

use domus_core::types::DbId;
use domus_db::repositories::{InvoiceRepo, TicketRepo};
use domus_db::DbPool;

/// Side effects the engine may request, one per proposal kind.
///
/// Each operation takes only a target id and reports whether the target was
/// still there to act on -- a vanished target is an expected outcome.
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    /// Queue a payment reminder to the invoice's tenant.
    async fn queue_invoice_reminder(&self, invoice_id: DbId) -> Result<bool, sqlx::Error>;

    /// Escalate a support ticket.
    async fn escalate_ticket(&self, ticket_id: DbId) -> Result<bool, sqlx::Error>;
}

/// Production dispatcher backed by the collaborator tables.
pub struct PgActionDispatcher {
    pool: DbPool,
}

impl PgActionDispatcher {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionDispatcher for PgActionDispatcher {
    async fn queue_invoice_reminder(&self, invoice_id: DbId) -> Result<bool, sqlx::Error> {
        InvoiceRepo::queue_reminder(&self.pool, invoice_id).await
    }

    async fn escalate_ticket(&self, ticket_id: DbId) -> Result<bool, sqlx::Error> {
        TicketRepo::escalate(&self.pool, ticket_id).await
    }
}
