//! Integration tests for the approval ledger and audit trail invariants:
//! idempotent decision recording, at-most-once execution, and per-kind
//! budget counting.

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use domus_db::models::approval::CreateApproval;
use domus_db::models::audit::CreateAudit;
use domus_db::repositories::{ApprovalRepo, AuditRepo};

fn decision(proposal_id: &str) -> CreateApproval {
    CreateApproval {
        proposal_id: proposal_id.to_string(),
        decision: "APPROVED".to_string(),
        decided_by: "SYSTEM".to_string(),
        note: None,
        proposal_snapshot: json!({"id": proposal_id, "kind": "REMIND_INVOICE"}),
        proposal_hash: "deadbeef".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Idempotent auto-approval
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_decision_creates_once(pool: PgPool) {
    let input = decision("REMIND_INVOICE:OVERDUE_INVOICE:1:w3-3");

    let (first, created_first) = ApprovalRepo::insert_decision(&pool, &input).await.unwrap();
    assert!(created_first);

    let (second, created_second) = ApprovalRepo::insert_decision(&pool, &input).await.unwrap();
    assert!(!created_second);
    assert_eq!(first.id, second.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approvals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_decision_observes_manual_rejection(pool: PgPool) {
    let mut manual = decision("ESCALATE_TICKET:NO_REPLY_TICKET:9:w3-3");
    manual.decision = "REJECTED".to_string();
    manual.decided_by = "42".to_string();
    ApprovalRepo::insert_manual(&pool, &manual).await.unwrap();

    // The auto path must see the human decision, not overwrite it.
    let auto = decision("ESCALATE_TICKET:NO_REPLY_TICKET:9:w3-3");
    let (existing, created) = ApprovalRepo::insert_decision(&pool, &auto).await.unwrap();
    assert!(!created);
    assert_eq!(existing.decision, "REJECTED");
    assert_eq!(existing.decided_by, "42");
}

// ---------------------------------------------------------------------------
// Strict manual insert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_manual_decision_violates_unique_constraint(pool: PgPool) {
    let input = decision("REMIND_INVOICE:OVERDUE_INVOICE:7:w3-3");
    ApprovalRepo::insert_manual(&pool, &input).await.unwrap();

    let err = ApprovalRepo::insert_manual(&pool, &input)
        .await
        .expect_err("second decision must conflict");

    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_approvals_proposal_id"));
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// At-most-once execution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_executed_sets_executed_at_once(pool: PgPool) {
    let input = decision("REMIND_INVOICE:OVERDUE_INVOICE:2:w3-3");
    let (approval, _) = ApprovalRepo::insert_decision(&pool, &input).await.unwrap();
    assert!(approval.executed_at.is_none());

    let result = json!({"status": "EXECUTED"});
    let updated = ApprovalRepo::mark_executed(&pool, approval.id, &result)
        .await
        .unwrap()
        .expect("first execution recording must win");
    assert!(updated.executed_at.is_some());
    assert_eq!(updated.execute_result, Some(result.clone()));

    // Any further attempt observes the guard and records nothing.
    let second = ApprovalRepo::mark_executed(&pool, approval.id, &json!({"status": "EXECUTED"}))
        .await
        .unwrap();
    assert!(second.is_none());

    let reread = ApprovalRepo::find_by_id(&pool, approval.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread.executed_at, updated.executed_at);
}

// ---------------------------------------------------------------------------
// Budget counting
// ---------------------------------------------------------------------------

async fn audit_executed(pool: &PgPool, approval_id: i64, kind: &str, dry_run: bool) {
    AuditRepo::insert(
        pool,
        &CreateAudit {
            approval_id,
            proposal_id: format!("{kind}:x:{approval_id}:w3-3"),
            proposal_kind: kind.to_string(),
            action: "AUTO_EXECUTED",
            actor_id: "SYSTEM".to_string(),
            dry_run,
            result: None,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn executed_count_is_per_kind_and_ignores_dry_runs(pool: PgPool) {
    let (a, _) = ApprovalRepo::insert_decision(&pool, &decision("p1")).await.unwrap();
    let (b, _) = ApprovalRepo::insert_decision(&pool, &decision("p2")).await.unwrap();
    let (c, _) = ApprovalRepo::insert_decision(&pool, &decision("p3")).await.unwrap();

    audit_executed(&pool, a.id, "REMIND_INVOICE", false).await;
    audit_executed(&pool, b.id, "REMIND_INVOICE", true).await; // dry run
    audit_executed(&pool, c.id, "ESCALATE_TICKET", false).await;

    let day_start = Utc::now() - Duration::hours(1);
    let invoices = AuditRepo::count_executed_since(&pool, "REMIND_INVOICE", day_start)
        .await
        .unwrap();
    let tickets = AuditRepo::count_executed_since(&pool, "ESCALATE_TICKET", day_start)
        .await
        .unwrap();

    assert_eq!(invoices, 1);
    assert_eq!(tickets, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_rollup_groups_by_kind_and_action(pool: PgPool) {
    let (a, _) = ApprovalRepo::insert_decision(&pool, &decision("p1")).await.unwrap();

    AuditRepo::insert(
        &pool,
        &CreateAudit {
            approval_id: a.id,
            proposal_id: a.proposal_id.clone(),
            proposal_kind: "REMIND_INVOICE".to_string(),
            action: "AUTO_APPROVED",
            actor_id: "SYSTEM".to_string(),
            dry_run: false,
            result: None,
        },
    )
    .await
    .unwrap();
    audit_executed(&pool, a.id, "REMIND_INVOICE", false).await;

    let since = Utc::now() - Duration::days(7);
    let rows = AuditRepo::activity_since(&pool, since).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .any(|r| r.action == "AUTO_APPROVED" && r.count == 1));
    assert!(rows
        .iter()
        .any(|r| r.action == "AUTO_EXECUTED" && r.count == 1));
}
