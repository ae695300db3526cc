//! Admin-side working set of page definitions.
//!
//! Drafts live only here until saved. Deleting asks for confirmation through
//! a [`ConfirmPrompt`], which is dismissed whichever way the deletion ends.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::gateway::PageStore;
use crate::page::{self, PageDefinition};
use crate::types::FieldId;

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// A yes/no confirmation shown to the admin.
#[async_trait]
pub trait ConfirmPrompt: Send {
    /// Show the prompt.
    fn present(&mut self, message: &str);

    /// Wait for the admin's answer. Only an explicit accept returns `true`.
    async fn decision(&mut self) -> bool;

    /// Close the prompt.
    fn dismiss(&mut self);
}

/// A prompt whose answer is already known, e.g. from a request parameter.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub bool);

#[async_trait]
impl ConfirmPrompt for FixedDecision {
    fn present(&mut self, message: &str) {
        tracing::debug!(message, accepted = self.0, "Confirmation requested");
    }

    async fn decision(&mut self) -> bool {
        self.0
    }

    fn dismiss(&mut self) {}
}

/// Keeps a prompt open for its lifetime and dismisses it on drop.
struct OpenPrompt<'a> {
    prompt: &'a mut dyn ConfirmPrompt,
}

impl<'a> OpenPrompt<'a> {
    fn present(prompt: &'a mut dyn ConfirmPrompt, message: &str) -> Self {
        prompt.present(message);
        Self { prompt }
    }

    async fn accepted(&mut self) -> bool {
        self.prompt.decision().await
    }
}

impl Drop for OpenPrompt<'_> {
    fn drop(&mut self) {
        self.prompt.dismiss();
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// The pages an admin is working on, saved and unsaved.
#[derive(Debug, Clone, Default)]
pub struct PageEditor {
    pages: Vec<PageDefinition>,
}

impl PageEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the pages currently in the store.
    pub async fn load(store: &dyn PageStore) -> Result<Self, CoreError> {
        let pages = store.list_pages().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load pages for editor");
            e
        })?;
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[PageDefinition] {
        &self.pages
    }

    fn page(&self, index: usize) -> Result<&PageDefinition, CoreError> {
        self.pages.get(index).ok_or_else(|| CoreError::NotFound {
            entity: "PageDraft",
            id: index.to_string(),
        })
    }

    /// Mutable access for local edits (heading, placeholders, types).
    pub fn page_mut(&mut self, index: usize) -> Result<&mut PageDefinition, CoreError> {
        self.pages.get_mut(index).ok_or_else(|| CoreError::NotFound {
            entity: "PageDraft",
            id: index.to_string(),
        })
    }

    /// Append a new draft page and return its index.
    pub fn add_draft(&mut self) -> usize {
        self.pages.push(page::create_draft());
        self.pages.len() - 1
    }

    /// Reopen a page for editing.
    pub fn edit(&mut self, index: usize) -> Result<(), CoreError> {
        self.page_mut(index)?.is_editing = true;
        Ok(())
    }

    /// Add a text field to a page and return the new field's id.
    pub fn add_field(&mut self, index: usize) -> Result<FieldId, CoreError> {
        let slot = self.page_mut(index)?;
        *slot = page::add_field(std::mem::take(slot));
        let field = slot.inputs.last().map(|f| f.input_id.clone());
        field.ok_or_else(|| CoreError::Internal("Field was not added".to_string()))
    }

    pub fn remove_field(&mut self, index: usize, input_id: &FieldId) -> Result<(), CoreError> {
        let slot = self.page_mut(index)?;
        *slot = page::remove_field(std::mem::take(slot), input_id);
        Ok(())
    }

    pub fn can_save(&self, index: usize) -> bool {
        self.page(index).is_ok_and(page::can_save)
    }

    /// Save a page and replace the working copy with the stored version.
    ///
    /// On any failure the working copy is left as it was.
    pub async fn save(
        &mut self,
        index: usize,
        store: &dyn PageStore,
    ) -> Result<&PageDefinition, CoreError> {
        let saved = match page::save(self.page(index)?, store).await {
            Ok(saved) => saved,
            Err(e) => {
                if matches!(e, CoreError::Gateway(_)) {
                    tracing::warn!(index, error = %e, "Failed to save page");
                }
                return Err(e);
            }
        };
        let slot = self.page_mut(index)?;
        *slot = saved;
        Ok(slot)
    }

    /// Delete a page after explicit confirmation.
    ///
    /// Pages that were never saved are only dropped locally. Returns `false`
    /// when the admin declined. The prompt is dismissed on every path.
    pub async fn delete(
        &mut self,
        index: usize,
        store: &dyn PageStore,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Result<bool, CoreError> {
        let target = self.page(index)?;
        let message = if target.heading.trim().is_empty() {
            format!("Delete page {}?", index + 1)
        } else {
            format!("Delete page '{}'?", target.heading)
        };

        let mut open = OpenPrompt::present(prompt, &message);
        if !open.accepted().await {
            tracing::debug!(index, "Page deletion cancelled");
            return Ok(false);
        }

        let target = self.page(index)?;
        if target.is_persisted() {
            if let Some(id) = target.id.clone() {
                store.delete_page(&id).await.map_err(|e| {
                    tracing::warn!(page_id = %id, error = %e, "Failed to delete page");
                    e
                })?;
                tracing::info!(page_id = %id, "Page deleted");
            }
        }

        self.pages.remove(index);
        drop(open);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
