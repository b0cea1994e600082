//! Ticket models: the engine's read-only view of the support subsystem.

use domus_core::execution::TicketLiveState;
use domus_core::proposal::NoReplyTicketCandidate;
use domus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tickets` table (engine-relevant columns only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub room_id: DbId,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub last_reply_at: Option<Timestamp>,
    pub escalated_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Row shape of the no-reply-ticket candidate feed query.
#[derive(Debug, Clone, FromRow)]
pub struct NoReplyTicketRow {
    pub ticket_id: DbId,
    pub days_open: i64,
    pub last_reply_at: Option<Timestamp>,
}

impl From<NoReplyTicketRow> for NoReplyTicketCandidate {
    fn from(row: NoReplyTicketRow) -> Self {
        NoReplyTicketCandidate {
            ticket_id: row.ticket_id,
            days_open: row.days_open,
            last_reply_at: row.last_reply_at,
        }
    }
}

/// Row shape of the execution-time status re-read.
#[derive(Debug, Clone, FromRow)]
pub struct TicketStateRow {
    pub status: String,
    pub escalated_at: Option<Timestamp>,
}

impl From<TicketStateRow> for TicketLiveState {
    fn from(row: TicketStateRow) -> Self {
        TicketLiveState {
            status: row.status,
            escalated_at: row.escalated_at,
        }
    }
}
