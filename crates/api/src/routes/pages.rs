//! Route definitions for page definitions.
//!
//! Mounted at `/pages` by `api_routes()`.
//!
//! ```text
//! GET    /                 list_pages
//! POST   /                 create_page
//! PUT    /{id}             update_page
//! DELETE /{id}             delete_page (?confirm=true)
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::list_pages).post(pages::create_page))
        .route("/{id}", put(pages::update_page).delete(pages::delete_page))
}
