//! Integration tests for the candidate feeds and the policy store.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use domus_core::proposal::ProposalKind;
use domus_core::severity::AutoApproveCeiling;
use domus_db::models::policy::UpsertPolicy;
use domus_db::repositories::{InvoiceRepo, PolicyRepo, TicketRepo};

async fn seed_invoice(pool: &PgPool, status: &str, days_overdue: i64, paid: bool) -> i64 {
    let due_date = Utc::now().date_naive() - Duration::days(days_overdue);
    sqlx::query_scalar(
        "INSERT INTO invoices (tenant_id, room_id, period_month, status, due_date, paid_at)
         VALUES (1, 1, '2025-05', $1, $2, CASE WHEN $3 THEN now() ELSE NULL END)
         RETURNING id",
    )
    .bind(status)
    .bind(due_date)
    .bind(paid)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_ticket(pool: &PgPool, status: &str, days_open: i64, replied: bool) -> i64 {
    let created_at = Utc::now() - Duration::days(days_open);
    sqlx::query_scalar(
        "INSERT INTO tickets (room_id, subject, status, created_at, last_reply_at)
         VALUES (1, 'leaking faucet', $1, $2, CASE WHEN $3 THEN now() ELSE NULL END)
         RETURNING id",
    )
    .bind(status)
    .bind(created_at)
    .bind(replied)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Invoice feed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn overdue_feed_filters_and_orders(pool: PgPool) {
    let as_of = Utc::now().date_naive();

    let qualifying = seed_invoice(&pool, "SENT", 10, false).await;
    seed_invoice(&pool, "SENT", 1, false).await; // not overdue enough
    seed_invoice(&pool, "SENT", 10, true).await; // paid
    seed_invoice(&pool, "DRAFT", 10, false).await; // never sent
    let also_qualifying = seed_invoice(&pool, "SENT", 40, false).await;

    let candidates = InvoiceRepo::overdue_candidates(&pool, 3, as_of).await.unwrap();

    let ids: Vec<i64> = candidates.iter().map(|c| c.invoice_id).collect();
    assert_eq!(ids, vec![qualifying, also_qualifying]);
    assert_eq!(candidates[0].overdue_days, 10);
    assert_eq!(candidates[1].overdue_days, 40);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overdue_feed_is_deterministic(pool: PgPool) {
    let as_of = Utc::now().date_naive();
    seed_invoice(&pool, "SENT", 8, false).await;
    seed_invoice(&pool, "SENT", 15, false).await;

    let first = InvoiceRepo::overdue_candidates(&pool, 3, as_of).await.unwrap();
    let second = InvoiceRepo::overdue_candidates(&pool, 3, as_of).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn queue_reminder_enqueues_and_bumps_count(pool: PgPool) {
    let invoice_id = seed_invoice(&pool, "SENT", 10, false).await;

    assert!(InvoiceRepo::queue_reminder(&pool, invoice_id).await.unwrap());

    let outbox: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reminder_outbox WHERE invoice_id = $1")
            .bind(invoice_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(outbox, 1);

    let reminder_count: i32 =
        sqlx::query_scalar("SELECT reminder_count FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(reminder_count, 1);

    // A vanished invoice is reported, not an error.
    assert!(!InvoiceRepo::queue_reminder(&pool, 999_999).await.unwrap());
}

// ---------------------------------------------------------------------------
// Ticket feed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn no_reply_feed_filters_and_orders(pool: PgPool) {
    let as_of = Utc::now().date_naive();

    let qualifying = seed_ticket(&pool, "OPEN", 6, false).await;
    seed_ticket(&pool, "OPEN", 1, false).await; // too fresh
    seed_ticket(&pool, "OPEN", 6, true).await; // already answered
    seed_ticket(&pool, "CLOSED", 6, false).await; // closed

    let candidates = TicketRepo::no_reply_candidates(&pool, 3, as_of).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].ticket_id, qualifying);
    assert_eq!(candidates[0].days_open, 6);
    assert!(candidates[0].last_reply_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn escalate_skips_closed_tickets(pool: PgPool) {
    let open = seed_ticket(&pool, "OPEN", 6, false).await;
    let closed = seed_ticket(&pool, "CLOSED", 6, false).await;

    assert!(TicketRepo::escalate(&pool, open).await.unwrap());
    assert!(!TicketRepo::escalate(&pool, closed).await.unwrap());

    let (priority, escalated_at): (String, Option<chrono::DateTime<Utc>>) =
        sqlx::query_as("SELECT priority, escalated_at FROM tickets WHERE id = $1")
            .bind(open)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(priority, "URGENT");
    assert!(escalated_at.is_some());
}

// ---------------------------------------------------------------------------
// Policy store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn policy_upsert_replaces_existing_row(pool: PgPool) {
    let input = UpsertPolicy {
        proposal_kind: ProposalKind::RemindInvoice,
        max_severity: AutoApproveCeiling::Medium,
        auto_approve: true,
        auto_execute: true,
        daily_limit: 10,
        enabled: true,
    };
    let created = PolicyRepo::upsert(&pool, &input).await.unwrap();
    assert_eq!(created.proposal_kind, "REMIND_INVOICE");

    let replaced = PolicyRepo::upsert(
        &pool,
        &UpsertPolicy {
            daily_limit: 2,
            enabled: false,
            ..input
        },
    )
    .await
    .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.daily_limit, 2);
    assert!(!replaced.enabled);

    let all = PolicyRepo::list_all(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(PolicyRepo::list_enabled(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn policy_snapshot_parses_ceiling(pool: PgPool) {
    let created = PolicyRepo::upsert(
        &pool,
        &UpsertPolicy {
            proposal_kind: ProposalKind::EscalateTicket,
            max_severity: AutoApproveCeiling::Low,
            auto_approve: true,
            auto_execute: false,
            daily_limit: 5,
            enabled: true,
        },
    )
    .await
    .unwrap();

    let snapshot = created.snapshot().unwrap();
    assert_eq!(snapshot.max_severity, AutoApproveCeiling::Low);
    assert!(snapshot.auto_approve);
    assert!(!snapshot.auto_execute);
    assert_eq!(created.kind(), Some(ProposalKind::EscalateTicket));
}
