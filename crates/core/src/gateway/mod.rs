//! Persistence gateway: the key/value document interface the core writes
//! through.
//!
//! Two collections are addressed, `pages` and `submissions`. Every write is
//! an independent last-writer-wins operation; there are no transactions and
//! no concurrency tokens.

pub mod memory;

use async_trait::async_trait;

use crate::page::{PageContent, PageDefinition, PageUpdate};
use crate::session::SessionId;
use crate::submission::Submission;
use crate::types::PageId;

/// Collection holding page definitions.
pub const PAGES_COLLECTION: &str = "pages";

/// Collection holding per-user submissions.
pub const SUBMISSIONS_COLLECTION: &str = "submissions";

/// Failures reported by a gateway implementation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{collection} document '{key}' not found")]
    NotFound {
        collection: &'static str,
        key: String,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed {collection} document: {message}")]
    Serialization {
        collection: &'static str,
        message: String,
    },
}

/// Access to the `pages` collection.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// All pages, in the order they were created.
    async fn list_pages(&self) -> Result<Vec<PageDefinition>, GatewayError>;

    /// Insert a page. The store assigns the id.
    async fn create_page(&self, content: &PageContent) -> Result<PageDefinition, GatewayError>;

    /// Patch an existing page. Fails with `NotFound` when the id is unknown.
    async fn update_page(&self, id: &PageId, update: &PageUpdate) -> Result<(), GatewayError>;

    /// Remove a page. Deleting an unknown id is not an error.
    async fn delete_page(&self, id: &PageId) -> Result<(), GatewayError>;
}

/// Access to the `submissions` collection.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get_submission(&self, id: &SessionId) -> Result<Option<Submission>, GatewayError>;

    /// Overwrite the whole submission document.
    async fn set_submission(
        &self,
        id: &SessionId,
        submission: &Submission,
    ) -> Result<(), GatewayError>;

    /// All submissions, in a stable order.
    async fn list_submissions(&self) -> Result<Vec<(SessionId, Submission)>, GatewayError>;
}

/// A store serving both collections.
pub trait DocumentStore: PageStore + SubmissionStore {
    /// Upcast for callers that only need page access.
    fn as_page_store(&self) -> &dyn PageStore;

    /// Upcast for callers that only need submission access.
    fn as_submission_store(&self) -> &dyn SubmissionStore;
}

impl<T: PageStore + SubmissionStore> DocumentStore for T {
    fn as_page_store(&self) -> &dyn PageStore {
        self
    }

    fn as_submission_store(&self) -> &dyn SubmissionStore {
        self
    }
}
