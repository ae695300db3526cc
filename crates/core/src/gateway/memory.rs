//! In-process gateway backed by ordered maps.
//!
//! Used for tests and for running the service without a database. It can be
//! switched offline, or to read-only, to exercise the failure paths of its
//! callers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::{GatewayError, PageStore, SubmissionStore, PAGES_COLLECTION};
use crate::page::{PageContent, PageDefinition, PageUpdate};
use crate::session::SessionId;
use crate::submission::Submission;
use crate::types::PageId;

/// Thread-safe in-memory document store.
#[derive(Default)]
pub struct InMemoryGateway {
    pages: RwLock<IndexMap<PageId, PageContent>>,
    submissions: RwLock<IndexMap<SessionId, Submission>>,
    offline: AtomicBool,
    read_only: AtomicBool,
    page_deletes: AtomicUsize,
    submission_writes: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// While read-only, reads succeed and every write fails with `Unavailable`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of `delete_page` calls that reached the store.
    pub fn page_delete_count(&self) -> usize {
        self.page_deletes.load(Ordering::SeqCst)
    }

    /// Number of `set_submission` calls that reached the store.
    pub fn submission_write_count(&self) -> usize {
        self.submission_writes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable("in-memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn ensure_writable(&self) -> Result<(), GatewayError> {
        self.ensure_online()?;
        if self.read_only.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable("in-memory store is read-only".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageStore for InMemoryGateway {
    async fn list_pages(&self) -> Result<Vec<PageDefinition>, GatewayError> {
        self.ensure_online()?;
        Ok(self
            .pages
            .read()
            .await
            .iter()
            .map(|(id, content)| PageDefinition::persisted(id.clone(), content.clone()))
            .collect())
    }

    async fn create_page(&self, content: &PageContent) -> Result<PageDefinition, GatewayError> {
        self.ensure_writable()?;
        let id = PageId::generate();
        self.pages.write().await.insert(id.clone(), content.clone());
        Ok(PageDefinition::persisted(id, content.clone()))
    }

    async fn update_page(&self, id: &PageId, update: &PageUpdate) -> Result<(), GatewayError> {
        self.ensure_writable()?;
        let mut pages = self.pages.write().await;
        let content = pages.get_mut(id).ok_or_else(|| GatewayError::NotFound {
            collection: PAGES_COLLECTION,
            key: id.to_string(),
        })?;
        update.apply_to(content);
        Ok(())
    }

    async fn delete_page(&self, id: &PageId) -> Result<(), GatewayError> {
        self.ensure_writable()?;
        self.page_deletes.fetch_add(1, Ordering::SeqCst);
        // shift_remove keeps the creation order of the remaining pages.
        self.pages.write().await.shift_remove(id);
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for InMemoryGateway {
    async fn get_submission(&self, id: &SessionId) -> Result<Option<Submission>, GatewayError> {
        self.ensure_online()?;
        Ok(self.submissions.read().await.get(id).cloned())
    }

    async fn set_submission(
        &self,
        id: &SessionId,
        submission: &Submission,
    ) -> Result<(), GatewayError> {
        self.ensure_writable()?;
        self.submission_writes.fetch_add(1, Ordering::SeqCst);
        self.submissions
            .write()
            .await
            .insert(id.clone(), submission.clone());
        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<(SessionId, Submission)>, GatewayError> {
        self.ensure_online()?;
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .map(|(id, s)| (id.clone(), s.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::page::{FieldType, InputFieldSpec};
    use crate::types::FieldId;

    fn content(heading: &str) -> PageContent {
        PageContent {
            heading: heading.to_string(),
            inputs: vec![InputFieldSpec {
                input_id: FieldId::from("f1"),
                field_type: Some(FieldType::Text),
                placeholder: "Name".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn pages_list_in_creation_order() {
        let store = InMemoryGateway::new();
        store.create_page(&content("one")).await.unwrap();
        let second = store.create_page(&content("two")).await.unwrap();
        store.create_page(&content("three")).await.unwrap();
        store.delete_page(second.id.as_ref().unwrap()).await.unwrap();

        let headings: Vec<_> = store
            .list_pages()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.heading)
            .collect();
        assert_eq!(headings, ["one", "three"]);
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let store = InMemoryGateway::new();
        let page = store.create_page(&content("one")).await.unwrap();
        let id = page.id.unwrap();
        let update = PageUpdate {
            heading: Some("renamed".to_string()),
            inputs: None,
        };
        store.update_page(&id, &update).await.unwrap();

        let pages = store.list_pages().await.unwrap();
        assert_eq!(pages[0].heading, "renamed");
        assert_eq!(pages[0].inputs.len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_page_is_not_found() {
        let store = InMemoryGateway::new();
        let result = store
            .update_page(&PageId::from("missing"), &PageUpdate::default())
            .await;
        assert_matches!(result, Err(GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn submissions_overwrite_whole_document() {
        let store = InMemoryGateway::new();
        let id = SessionId::from_email("a@b.co");
        let mut sub = Submission {
            last_saved: Some(1),
            ..Default::default()
        };
        store.set_submission(&id, &sub).await.unwrap();
        sub.last_saved = None;
        sub.has_submitted = true;
        store.set_submission(&id, &sub).await.unwrap();

        let stored = store.get_submission(&id).await.unwrap().unwrap();
        assert_eq!(stored, sub);
        assert_eq!(store.submission_write_count(), 2);
        assert_eq!(store.list_submissions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = InMemoryGateway::new();
        store.set_offline(true);
        assert_matches!(store.list_pages().await, Err(GatewayError::Unavailable(_)));
        assert_matches!(
            store.get_submission(&SessionId::from_email("x@y.z")).await,
            Err(GatewayError::Unavailable(_))
        );
        store.set_offline(false);
        assert!(store.list_pages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_only_store_rejects_writes_only() {
        let store = InMemoryGateway::new();
        let id = SessionId::from_email("a@b.co");
        store.set_read_only(true);

        assert_matches!(
            store.set_submission(&id, &Submission::default()).await,
            Err(GatewayError::Unavailable(_))
        );
        assert_matches!(
            store.create_page(&content("one")).await,
            Err(GatewayError::Unavailable(_))
        );
        assert_eq!(store.submission_write_count(), 0);
        assert!(store.get_submission(&id).await.unwrap().is_none());
        assert!(store.list_pages().await.unwrap().is_empty());
    }
}
