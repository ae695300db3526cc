//! Handlers for wizard sessions.
//!
//! A session is opened over the page definitions current at that moment and
//! lives in [`WizardSessions`](crate::sessions::WizardSessions) until closed.
//! Every response carries the wizard view, so clients never track step state
//! themselves.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use onboard_core::error::CoreError;
use onboard_core::types::FieldId;
use onboard_core::wizard::{Wizard, WizardView};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::sessions::SessionHandle;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A wizard view tagged with the session it belongs to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub view: WizardView,
}

/// One answer for a field on the active step.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAnswerRequest {
    pub input_id: FieldId,
    #[serde(default)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_session(state: &AppState, sid: Uuid) -> AppResult<SessionHandle> {
    state.sessions.get(sid).await.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "WizardSession",
            id: sid.to_string(),
        })
    })
}

fn respond(sid: Uuid, wizard: &Wizard) -> Json<DataResponse<SessionResponse>> {
    Json(DataResponse {
        data: SessionResponse {
            session_id: sid,
            view: wizard.view(),
        },
    })
}

// ---------------------------------------------------------------------------
// POST /wizard/sessions
// ---------------------------------------------------------------------------

/// Open a session over the current pages, logged out at step 0.
pub async fn open_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let wizard = Wizard::load(state.store.as_page_store()).await?;
    let steps = wizard.page_count() + 1;
    let view = wizard.view();

    let sid = state.sessions.open(wizard).await;
    tracing::info!(session_id = %sid, steps, "Wizard session opened");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionResponse {
                session_id: sid,
                view,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /wizard/sessions/{sid}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, sid).await?;
    let wizard = handle.lock().await;
    Ok(respond(sid, &wizard))
}

// ---------------------------------------------------------------------------
// DELETE /wizard/sessions/{sid}
// ---------------------------------------------------------------------------

/// Close a session. Stored submission data is not touched.
pub async fn close_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    if !state.sessions.close(sid).await {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "WizardSession",
            id: sid.to_string(),
        }));
    }
    tracing::info!(session_id = %sid, "Wizard session closed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// PUT /wizard/sessions/{sid}/answers
// ---------------------------------------------------------------------------

/// Record one answer on the active step.
pub async fn set_answer(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(body): Json<SetAnswerRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, sid).await?;
    let mut wizard = handle.lock().await;
    wizard.set_answer(&body.input_id, &body.value)?;
    Ok(respond(sid, &wizard))
}

// ---------------------------------------------------------------------------
// POST /wizard/sessions/{sid}/next
// ---------------------------------------------------------------------------

/// Advance one step. On step 0 this logs in and resumes earlier progress.
pub async fn next_step(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, sid).await?;
    let mut wizard = handle.lock().await;
    let phase = wizard.next(state.store.as_submission_store()).await?;
    tracing::debug!(session_id = %sid, ?phase, "Wizard advanced");
    Ok(respond(sid, &wizard))
}

// ---------------------------------------------------------------------------
// POST /wizard/sessions/{sid}/back
// ---------------------------------------------------------------------------

pub async fn go_back(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, sid).await?;
    let mut wizard = handle.lock().await;
    wizard.back()?;
    Ok(respond(sid, &wizard))
}

// ---------------------------------------------------------------------------
// POST /wizard/sessions/{sid}/submit
// ---------------------------------------------------------------------------

/// Finalize the submission from the last step.
pub async fn submit(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, sid).await?;
    let mut wizard = handle.lock().await;
    let phase = wizard.submit(state.store.as_submission_store()).await?;
    tracing::info!(session_id = %sid, ?phase, "Wizard submitted");
    Ok(respond(sid, &wizard))
}
