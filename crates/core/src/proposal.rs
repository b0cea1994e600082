//! Proposal model and the deterministic candidate-to-proposal generator.
//!
//! A proposal is a derived, identity-stable suggestion to take one automated
//! action on one target. It is computed fresh on every run and becomes
//! durable only as the snapshot embedded in an approval, so its identity must
//! be a pure function of the inputs: re-running generation over the same
//! candidates and window always yields the same ids, in the same order.

use serde::{Deserialize, Serialize};

use crate::hashing;
use crate::severity::{severity_for_days_open, severity_for_overdue_days, Severity};
use crate::types::{DbId, ProposalId, Timestamp};

// ---------------------------------------------------------------------------
// Kind and source
// ---------------------------------------------------------------------------

/// What action a proposal suggests. Adding a variant here forces every
/// executor and evaluator match to be extended at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalKind {
    RemindInvoice,
    EscalateTicket,
}

impl ProposalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalKind::RemindInvoice => "REMIND_INVOICE",
            ProposalKind::EscalateTicket => "ESCALATE_TICKET",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "REMIND_INVOICE" => Some(ProposalKind::RemindInvoice),
            "ESCALATE_TICKET" => Some(ProposalKind::EscalateTicket),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fact produced the proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalSource {
    OverdueInvoice,
    NoReplyTicket,
    RepeatedReminder,
}

impl ProposalSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalSource::OverdueInvoice => "OVERDUE_INVOICE",
            ProposalSource::NoReplyTicket => "NO_REPLY_TICKET",
            ProposalSource::RepeatedReminder => "REPEATED_REMINDER",
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates (rows from the read-only collaborator feeds)
// ---------------------------------------------------------------------------

/// An overdue-invoice fact from the invoice feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueInvoiceCandidate {
    pub invoice_id: DbId,
    pub tenant_id: DbId,
    pub room_id: DbId,
    /// Billing period as `YYYY-MM`.
    pub period_month: String,
    pub overdue_days: i64,
    /// How many reminders have already been sent for this invoice.
    pub reminder_count: i32,
}

/// A no-reply-ticket fact from the ticket feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoReplyTicketCandidate {
    pub ticket_id: DbId,
    pub days_open: i64,
    pub last_reply_at: Option<Timestamp>,
}

/// The window parameters generation ran with. Part of every proposal id, so
/// the same candidate under different thresholds is a different proposal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationWindow {
    pub min_overdue_days: i64,
    pub ticket_threshold_days: i64,
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// A derived suggestion to take one automated action on one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Deterministic composite identity, see [`proposal_id`].
    pub id: ProposalId,
    pub kind: ProposalKind,
    pub source: ProposalSource,
    pub target_id: DbId,
    /// Human-readable action, e.g. `"Send payment reminder to tenant 7"`.
    pub recommended_action: String,
    /// Why this proposal exists, e.g. `"Invoice 14 days overdue"`.
    pub reason: String,
    pub severity: Severity,
    pub generated_at: Timestamp,
}

impl Proposal {
    /// Canonical JSON snapshot as embedded in an approval row.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("proposal serialization cannot fail")
    }

    /// SHA-256 content hash of the canonical snapshot, recorded on the
    /// approval for tamper evidence.
    pub fn content_hash(&self) -> String {
        let canonical =
            serde_json::to_string(&self.snapshot()).expect("proposal serialization cannot fail");
        hashing::sha256_hex(&canonical)
    }
}

/// Compose the deterministic proposal identity from the target, kind, source,
/// and the window parameters used to generate it.
pub fn proposal_id(
    kind: ProposalKind,
    source: ProposalSource,
    target_id: DbId,
    window: &GenerationWindow,
) -> ProposalId {
    format!(
        "{}:{}:{}:w{}-{}",
        kind.as_str(),
        source.as_str(),
        target_id,
        window.min_overdue_days,
        window.ticket_threshold_days,
    )
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Turn candidate facts into proposals. Pure: no I/O, no clock reads -- the
/// caller supplies `now` so two calls with identical inputs are
/// byte-identical. Output order is invoices by feed order, then tickets.
pub fn generate_proposals(
    invoices: &[OverdueInvoiceCandidate],
    tickets: &[NoReplyTicketCandidate],
    window: &GenerationWindow,
    now: Timestamp,
) -> Vec<Proposal> {
    let mut proposals = Vec::with_capacity(invoices.len() + tickets.len());

    for candidate in invoices {
        if candidate.overdue_days < window.min_overdue_days {
            continue;
        }
        let source = if candidate.reminder_count > 0 {
            ProposalSource::RepeatedReminder
        } else {
            ProposalSource::OverdueInvoice
        };
        proposals.push(Proposal {
            id: proposal_id(
                ProposalKind::RemindInvoice,
                source,
                candidate.invoice_id,
                window,
            ),
            kind: ProposalKind::RemindInvoice,
            source,
            target_id: candidate.invoice_id,
            recommended_action: format!(
                "Send payment reminder to tenant {} for invoice {} ({})",
                candidate.tenant_id, candidate.invoice_id, candidate.period_month,
            ),
            reason: format!("Invoice {} days overdue", candidate.overdue_days),
            severity: severity_for_overdue_days(candidate.overdue_days),
            generated_at: now,
        });
    }

    for candidate in tickets {
        if candidate.days_open < window.ticket_threshold_days {
            continue;
        }
        proposals.push(Proposal {
            id: proposal_id(
                ProposalKind::EscalateTicket,
                ProposalSource::NoReplyTicket,
                candidate.ticket_id,
                window,
            ),
            kind: ProposalKind::EscalateTicket,
            source: ProposalSource::NoReplyTicket,
            target_id: candidate.ticket_id,
            recommended_action: format!("Escalate ticket {}", candidate.ticket_id),
            reason: format!("Ticket open {} days without a reply", candidate.days_open),
            severity: severity_for_days_open(candidate.days_open),
            generated_at: now,
        });
    }

    proposals
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
