pub mod health;
pub mod pages;
pub mod report;
pub mod wizard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pages                                   list, create
/// /pages/{id}                              update, delete (?confirm=true)
///
/// /wizard/sessions                         open session
/// /wizard/sessions/{sid}                   current view, close
/// /wizard/sessions/{sid}/answers           set one answer (PUT)
/// /wizard/sessions/{sid}/next              next step, login on step 0 (POST)
/// /wizard/sessions/{sid}/back              previous step (POST)
/// /wizard/sessions/{sid}/submit            final submit (POST)
///
/// /report                                  submissions as a table
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pages", pages::router())
        .nest("/wizard/sessions", wizard::router())
        .nest("/report", report::router())
}
