//! [`PgDocumentStore`]: the gateway traits over PostgreSQL.

use async_trait::async_trait;
use onboard_core::gateway::{
    GatewayError, PageStore, SubmissionStore, PAGES_COLLECTION, SUBMISSIONS_COLLECTION,
};
use onboard_core::page::{PageContent, PageDefinition, PageUpdate};
use onboard_core::session::SessionId;
use onboard_core::submission::Submission;
use onboard_core::types::PageId;

use crate::repositories::{PageRepo, SubmissionRepo};
use crate::DbPool;

/// Document store persisting both collections in PostgreSQL.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a sqlx error on `collection` into a gateway error.
///
/// Decode failures mean a stored document does not match the domain shape;
/// everything else is treated as the store being unreachable.
fn map_sqlx_error(collection: &'static str, err: sqlx::Error) -> GatewayError {
    match err {
        sqlx::Error::ColumnDecode { source, .. } => GatewayError::Serialization {
            collection,
            message: source.to_string(),
        },
        sqlx::Error::Decode(source) | sqlx::Error::Encode(source) => {
            GatewayError::Serialization {
                collection,
                message: source.to_string(),
            }
        }
        other => {
            tracing::error!(collection, error = %other, "Database error");
            GatewayError::Unavailable(other.to_string())
        }
    }
}

#[async_trait]
impl PageStore for PgDocumentStore {
    async fn list_pages(&self) -> Result<Vec<PageDefinition>, GatewayError> {
        let rows = PageRepo::list(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(PAGES_COLLECTION, e))?;
        Ok(rows.into_iter().map(PageDefinition::from).collect())
    }

    async fn create_page(&self, content: &PageContent) -> Result<PageDefinition, GatewayError> {
        let id = PageId::generate();
        let row = PageRepo::create(&self.pool, id.as_str(), content)
            .await
            .map_err(|e| map_sqlx_error(PAGES_COLLECTION, e))?;
        Ok(row.into())
    }

    async fn update_page(&self, id: &PageId, update: &PageUpdate) -> Result<(), GatewayError> {
        PageRepo::update(&self.pool, id.as_str(), update)
            .await
            .map_err(|e| map_sqlx_error(PAGES_COLLECTION, e))?
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound {
                collection: PAGES_COLLECTION,
                key: id.to_string(),
            })
    }

    async fn delete_page(&self, id: &PageId) -> Result<(), GatewayError> {
        let removed = PageRepo::delete(&self.pool, id.as_str())
            .await
            .map_err(|e| map_sqlx_error(PAGES_COLLECTION, e))?;
        if !removed {
            tracing::debug!(page_id = %id, "Delete of unknown page ignored");
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for PgDocumentStore {
    async fn get_submission(&self, id: &SessionId) -> Result<Option<Submission>, GatewayError> {
        let row = SubmissionRepo::find_by_user(&self.pool, id.as_str())
            .await
            .map_err(|e| map_sqlx_error(SUBMISSIONS_COLLECTION, e))?;
        Ok(row.map(|r| r.into_parts().1))
    }

    async fn set_submission(
        &self,
        id: &SessionId,
        submission: &Submission,
    ) -> Result<(), GatewayError> {
        SubmissionRepo::upsert(&self.pool, id.as_str(), submission)
            .await
            .map_err(|e| map_sqlx_error(SUBMISSIONS_COLLECTION, e))?;
        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<(SessionId, Submission)>, GatewayError> {
        let rows = SubmissionRepo::list(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(SUBMISSIONS_COLLECTION, e))?;
        Ok(rows.into_iter().map(|r| r.into_parts()).collect())
    }
}
