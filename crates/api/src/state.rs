use std::sync::Arc;

use onboard_core::gateway::DocumentStore;

use crate::config::ServerConfig;
use crate::sessions::WizardSessions;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything shared sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Document store serving the `pages` and `submissions` collections.
    pub store: Arc<dyn DocumentStore>,
    /// Database pool when running on PostgreSQL, used for health checks.
    pub pool: Option<onboard_db::DbPool>,
    pub config: Arc<ServerConfig>,
    /// Open wizard sessions.
    pub sessions: Arc<WizardSessions>,
}
