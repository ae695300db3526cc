//! Mounted at `/report` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(report::get_report))
}
