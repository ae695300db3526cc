//! Submission row.

use onboard_core::session::SessionId;
use onboard_core::submission::{Answers, Submission};
use onboard_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `submissions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub user_id: String,
    pub answers: Json<Answers>,
    pub last_saved: Option<i32>,
    pub has_submitted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubmissionRow {
    /// Split into the document key and the domain submission.
    pub fn into_parts(self) -> (SessionId, Submission) {
        let submission = Submission {
            answers: self.answers.0,
            // A negative step index cannot be written through the store.
            last_saved: self.last_saved.and_then(|v| u32::try_from(v).ok()),
            has_submitted: self.has_submitted,
        };
        (SessionId::from_raw(self.user_id), submission)
    }
}
