use std::sync::Arc;

use crate::config::{AutomationConfig, ServerConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: domus_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Automation engine configuration; snapshotted per invocation.
    pub automation: Arc<AutomationConfig>,
    /// Event bus for the best-effort activity channel.
    pub event_bus: Arc<domus_events::EventBus>,
}
