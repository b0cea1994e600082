//! Route definitions for the automation engine.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::automation;
use crate::state::AppState;

/// Automation routes, nested under `/automation`.
///
/// ```text
/// POST   /run                        run_auto
/// GET    /proposals                  list_proposals
/// POST   /decisions                  decide
/// GET    /approvals                  list_approvals
/// GET    /approvals/{id}             get_approval
/// POST   /approvals/{id}/execute     execute_approval
/// GET    /approvals/{id}/preview     preview_approval
/// GET    /metrics                    get_metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(automation::run_auto))
        .route("/proposals", get(automation::list_proposals))
        .route("/decisions", post(automation::decide))
        .route("/approvals", get(automation::list_approvals))
        .route("/approvals/{id}", get(automation::get_approval))
        .route("/approvals/{id}/execute", post(automation::execute_approval))
        .route("/approvals/{id}/preview", get(automation::preview_approval))
        .route("/metrics", get(automation::get_metrics))
}
