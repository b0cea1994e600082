//! Handlers for the automation engine endpoints.
//!
//! Mutating endpoints require authentication; the operator id is recorded
//! in the ledger and the audit trail. Every handler snapshots the
//! automation configuration once and passes it whole into the engine, so a
//! single invocation never observes a mid-flight config change.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use domus_core::approval::validate_decision;
use domus_core::error::CoreError;
use domus_core::policy::PolicyVerdict;
use domus_core::proposal::{generate_proposals, GenerationWindow, Proposal};
use domus_core::types::DbId;
use domus_db::models::approval::CreateApproval;
use domus_db::repositories::{ApprovalRepo, AuditRepo, InvoiceRepo, TicketRepo};

use crate::engine::{autorun, manual, metrics, PgActionDispatcher};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Auto-run
// ---------------------------------------------------------------------------

/// POST /api/v1/automation/run
///
/// Trigger one orchestrator invocation. No body; honors the kill switch.
pub async fn run_auto(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let config = state.automation.as_ref().clone();
    let dispatcher = PgActionDispatcher::new(state.pool.clone());

    tracing::info!(user_id = auth.user_id, "Auto-run triggered");

    let report = autorun::run(
        &state.pool,
        &state.event_bus,
        &dispatcher,
        &config,
        chrono::Utc::now(),
    )
    .await?;

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Proposals preview
// ---------------------------------------------------------------------------

/// One current proposal with its policy verdict and ledger status.
#[derive(Debug, Serialize)]
pub struct ProposalPreview {
    pub proposal: Proposal,
    pub verdict: PolicyVerdict,
    /// Set when a decision already exists for this proposal identity.
    pub approval_id: Option<DbId>,
}

/// GET /api/v1/automation/proposals
///
/// Generate current proposals read-only: what the next auto-run would see,
/// with each proposal's verdict and any existing decision. This is where
/// the manual-decision payload comes from.
pub async fn list_proposals(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let config = state.automation.as_ref().clone();
    let now = chrono::Utc::now();
    let as_of = now.date_naive();
    let window = GenerationWindow {
        min_overdue_days: config.min_overdue_days,
        ticket_threshold_days: config.ticket_threshold_days,
    };

    let invoices =
        InvoiceRepo::overdue_candidates(&state.pool, window.min_overdue_days, as_of).await?;
    let tickets =
        TicketRepo::no_reply_candidates(&state.pool, window.ticket_threshold_days, as_of).await?;
    let proposals = generate_proposals(&invoices, &tickets, &window, now);

    let policies = autorun::load_policy_lookup(&state.pool).await?;

    let mut previews = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let verdict = domus_core::policy::evaluate(proposal.severity, policies.get(&proposal.kind));
        let approval_id = ApprovalRepo::find_by_proposal_id(&state.pool, &proposal.id)
            .await?
            .map(|a| a.id);
        previews.push(ProposalPreview {
            proposal,
            verdict,
            approval_id,
        });
    }

    Ok(Json(DataResponse { data: previews }))
}

// ---------------------------------------------------------------------------
// Manual decide
// ---------------------------------------------------------------------------

/// Request body for the manual decision endpoint.
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub proposal: Proposal,
    pub decision: String,
    pub note: Option<String>,
}

/// POST /api/v1/automation/decisions
///
/// Record a one-shot human decision for a proposal. A second decision for
/// the same proposal identity is a conflict -- the ledger is never silently
/// overwritten for human decisions.
pub async fn decide(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DecideRequest>,
) -> AppResult<impl IntoResponse> {
    validate_decision(&input.decision)?;

    let create = CreateApproval {
        proposal_id: input.proposal.id.clone(),
        decision: input.decision.clone(),
        decided_by: auth.actor_id(),
        note: input.note,
        proposal_snapshot: input.proposal.snapshot(),
        proposal_hash: input.proposal.content_hash(),
    };

    let approval = ApprovalRepo::insert_manual(&state.pool, &create).await?;

    tracing::info!(
        user_id = auth.user_id,
        proposal_id = %approval.proposal_id,
        decision = %approval.decision,
        "Manual decision recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: approval })))
}

// ---------------------------------------------------------------------------
// Manual execute / preview
// ---------------------------------------------------------------------------

/// Request body for the manual execution endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub dry_run: bool,
}

/// POST /api/v1/automation/approvals/{id}/execute
///
/// Execute an approved proposal. Returns `SKIPPED` when it was already
/// executed or rejected; `dry_run` computes the outcome with zero writes.
pub async fn execute_approval(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(approval_id): Path<DbId>,
    input: Option<Json<ExecuteRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let config = state.automation.as_ref().clone();
    let dispatcher = PgActionDispatcher::new(state.pool.clone());

    let report = manual::execute_approval(
        &state.pool,
        &state.event_bus,
        &dispatcher,
        &config,
        approval_id,
        &auth.actor_id(),
        input.dry_run,
    )
    .await?;

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/automation/approvals/{id}/preview
///
/// The would-be execution outcome, computed against live state with no side
/// effects and no writes of any kind.
pub async fn preview_approval(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(approval_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let config = state.automation.as_ref().clone();
    let dispatcher = PgActionDispatcher::new(state.pool.clone());

    let report = manual::execute_approval(
        &state.pool,
        &state.event_bus,
        &dispatcher,
        &config,
        approval_id,
        &auth.actor_id(),
        true,
    )
    .await?;

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Ledger reads
// ---------------------------------------------------------------------------

/// Pagination parameters for the approvals listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/automation/approvals
pub async fn list_approvals(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let approvals = ApprovalRepo::list_recent(
        &state.pool,
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: approvals }))
}

/// GET /api/v1/automation/approvals/{id}
///
/// One approval with its full audit history.
pub async fn get_approval(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(approval_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let approval = ApprovalRepo::find_by_id(&state.pool, approval_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Approval",
            id: approval_id,
        })?;
    let audit = AuditRepo::list_for_approval(&state.pool, approval_id).await?;

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "approval": approval,
            "audit": audit,
        }),
    }))
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// GET /api/v1/automation/metrics
///
/// Last-7-days activity and guardrail report.
pub async fn get_metrics(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = metrics::report(&state.pool, chrono::Utc::now()).await?;
    Ok(Json(DataResponse { data: report }))
}
