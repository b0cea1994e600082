pub mod automation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /automation/run                        trigger auto-run (POST)
/// /automation/proposals                  current proposals + verdicts (GET)
/// /automation/decisions                  manual decision (POST)
/// /automation/approvals                  ledger listing (GET)
/// /automation/approvals/{id}             approval + audit history (GET)
/// /automation/approvals/{id}/execute     manual execution (POST)
/// /automation/approvals/{id}/preview     dry-run outcome (GET)
/// /automation/metrics                    7-day guardrail report (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/automation", automation::router())
}
