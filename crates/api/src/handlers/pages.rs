//! Handlers for page definitions.
//!
//! Create and update run the full save validation before anything reaches
//! the store. Delete goes through the page editor so the confirmation and
//! draft rules are the same everywhere.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use onboard_core::editor::{FixedDecision, PageEditor};
use onboard_core::error::CoreError;
use onboard_core::gateway::PageStore;
use onboard_core::page::{self, InputFieldSpec, PageContent, PageDefinition};
use onboard_core::types::PageId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Heading and fields of a page, as sent by the admin editor.
#[derive(Debug, Deserialize)]
pub struct PageBody {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub inputs: Vec<InputFieldSpec>,
}

impl From<PageBody> for PageContent {
    fn from(body: PageBody) -> Self {
        PageContent {
            heading: body.heading,
            inputs: body.inputs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeletePageParams {
    #[serde(default)]
    pub confirm: bool,
}

// ---------------------------------------------------------------------------
// GET /pages
// ---------------------------------------------------------------------------

/// List all page definitions in step order.
pub async fn list_pages(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pages = state.store.list_pages().await?;
    Ok(Json(DataResponse { data: pages }))
}

// ---------------------------------------------------------------------------
// POST /pages
// ---------------------------------------------------------------------------

/// Validate and insert a new page. The store assigns its id.
pub async fn create_page(
    State(state): State<AppState>,
    Json(body): Json<PageBody>,
) -> AppResult<impl IntoResponse> {
    let mut draft = page::create_draft();
    draft.heading = body.heading;
    draft.inputs = body.inputs;

    let saved = page::save(&draft, state.store.as_page_store()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

// ---------------------------------------------------------------------------
// PUT /pages/{id}
// ---------------------------------------------------------------------------

/// Validate and overwrite the heading and fields of an existing page.
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PageBody>,
) -> AppResult<impl IntoResponse> {
    let page = PageDefinition::persisted(PageId(id), body.into());
    let saved = page::save(&page, state.store.as_page_store()).await?;
    Ok(Json(DataResponse { data: saved }))
}

// ---------------------------------------------------------------------------
// DELETE /pages/{id}
// ---------------------------------------------------------------------------

/// Delete a page. Requires `?confirm=true`.
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeletePageParams>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_page_store();
    let mut editor = PageEditor::load(store).await?;

    let index = editor
        .pages()
        .iter()
        .position(|p| p.id.as_ref().is_some_and(|pid| pid.as_str() == id))
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Page",
                id: id.clone(),
            })
        })?;

    let mut prompt = FixedDecision(params.confirm);
    if !editor.delete(index, store, &mut prompt).await? {
        return Err(AppError::BadRequest(
            "Page deletion must be confirmed with confirm=true".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
