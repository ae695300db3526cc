//! Handler for the submissions report.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use onboard_core::gateway::{PageStore, SubmissionStore};
use onboard_core::report;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Project every submission onto the current page definitions.
pub async fn get_report(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pages = state.store.list_pages().await?;
    let submissions: Vec<_> = state
        .store
        .list_submissions()
        .await?
        .into_iter()
        .map(|(_, submission)| submission)
        .collect();

    let report = report::project(&pages, &submissions);
    tracing::debug!(
        columns = report.columns.len(),
        rows = report.rows.len(),
        "Report projected"
    );

    Ok(Json(DataResponse { data: report }))
}
