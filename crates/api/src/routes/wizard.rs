//! Route definitions for wizard sessions.
//!
//! Mounted at `/wizard/sessions` by `api_routes()`.
//!
//! ```text
//! POST   /                  open_session
//! GET    /{sid}             get_session
//! DELETE /{sid}             close_session
//! PUT    /{sid}/answers     set_answer
//! POST   /{sid}/next        next_step
//! POST   /{sid}/back        go_back
//! POST   /{sid}/submit      submit
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::wizard;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(wizard::open_session))
        .route(
            "/{sid}",
            get(wizard::get_session).delete(wizard::close_session),
        )
        .route("/{sid}/answers", put(wizard::set_answer))
        .route("/{sid}/next", post(wizard::next_step))
        .route("/{sid}/back", post(wizard::go_back))
        .route("/{sid}/submit", post(wizard::submit))
}
