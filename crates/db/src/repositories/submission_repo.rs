//! Repository for the `submissions` table.

use onboard_core::submission::Submission;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::submission::SubmissionRow;

/// Column list for `submissions` queries.
const COLUMNS: &str = "user_id, answers, last_saved, has_submitted, created_at, updated_at";

/// Provides read and whole-document write access to submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Find the submission stored for a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE user_id = $1");
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List every submission, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions ORDER BY created_at ASC, user_id ASC");
        sqlx::query_as::<_, SubmissionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Insert or fully replace a user's submission.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        submission: &Submission,
    ) -> Result<SubmissionRow, sqlx::Error> {
        let last_saved = encode_last_saved(submission.last_saved)?;
        let query = format!(
            "INSERT INTO submissions (user_id, answers, last_saved, has_submitted) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET \
                answers = EXCLUDED.answers, \
                last_saved = EXCLUDED.last_saved, \
                has_submitted = EXCLUDED.has_submitted, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(user_id)
            .bind(Json(&submission.answers))
            .bind(last_saved)
            .bind(submission.has_submitted)
            .fetch_one(pool)
            .await
    }
}

/// Convert a step number for the `INTEGER` column, refusing values it cannot
/// hold.
fn encode_last_saved(step: Option<u32>) -> Result<Option<i32>, sqlx::Error> {
    step.map(i32::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn last_saved_fits_column() {
        assert_eq!(encode_last_saved(None).unwrap(), None);
        assert_eq!(encode_last_saved(Some(3)).unwrap(), Some(3));
        assert_eq!(encode_last_saved(Some(i32::MAX as u32)).unwrap(), Some(i32::MAX));
    }

    #[test]
    fn oversized_last_saved_is_an_encode_error() {
        assert_matches!(
            encode_last_saved(Some(i32::MAX as u32 + 1)),
            Err(sqlx::Error::Encode(_))
        );
    }
}
