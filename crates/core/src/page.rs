//! Page definitions and the rules that gate saving them.
//!
//! A page is a heading plus an ordered list of typed input fields. Field
//! order is significant: it drives both the wizard's field order and the
//! report's column order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::gateway::PageStore;
use crate::report::ROW_ID_KEY;
use crate::submission::EMAIL_FIELD;
use crate::types::{FieldId, PageId};

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Report column width for `text` and `date` fields.
pub const NARROW_COLUMN_WIDTH: u32 = 230;

/// Report column width for `textarea` fields.
pub const WIDE_COLUMN_WIDTH: u32 = 500;

/// The kinds of input a page can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Date,
}

impl FieldType {
    /// Presentational width hint for the report column of this type.
    pub fn width_hint(self) -> u32 {
        match self {
            Self::Text | Self::Date => NARROW_COLUMN_WIDTH,
            Self::Textarea => WIDE_COLUMN_WIDTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// One input on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFieldSpec {
    pub input_id: FieldId,
    /// `None` only while a draft is being edited; persisted fields always
    /// carry a type.
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub placeholder: String,
}

impl InputFieldSpec {
    /// A fresh text field with an empty prompt.
    pub fn new_text() -> Self {
        Self {
            input_id: FieldId::generate(),
            field_type: Some(FieldType::Text),
            placeholder: String::new(),
        }
    }
}

/// A page definition, persisted or draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PageId>,
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub inputs: Vec<InputFieldSpec>,
    #[serde(skip)]
    pub is_editing: bool,
    #[serde(skip)]
    pub is_new: bool,
}

impl PageDefinition {
    /// Rebuild a persisted page from its stored document.
    pub fn persisted(id: PageId, content: PageContent) -> Self {
        Self {
            id: Some(id),
            heading: content.heading,
            inputs: content.inputs,
            is_editing: false,
            is_new: false,
        }
    }

    /// Whether this page has ever been written to the store.
    pub fn is_persisted(&self) -> bool {
        !self.is_new && self.id.is_some()
    }

    pub fn field(&self, input_id: &FieldId) -> Option<&InputFieldSpec> {
        self.inputs.iter().find(|f| &f.input_id == input_id)
    }
}

/// The stored body of a page document (everything except its key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub heading: String,
    pub inputs: Vec<InputFieldSpec>,
}

impl From<&PageDefinition> for PageContent {
    fn from(page: &PageDefinition) -> Self {
        Self {
            heading: page.heading.clone(),
            inputs: page.inputs.clone(),
        }
    }
}

/// Partial update of a stored page. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUpdate {
    pub heading: Option<String>,
    pub inputs: Option<Vec<InputFieldSpec>>,
}

impl PageUpdate {
    /// Apply this patch to a stored page body.
    pub fn apply_to(&self, content: &mut PageContent) {
        if let Some(heading) = &self.heading {
            content.heading = heading.clone();
        }
        if let Some(inputs) = &self.inputs {
            content.inputs = inputs.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Draft editing
// ---------------------------------------------------------------------------

/// A new, unsaved page with no heading and no fields, open for editing.
pub fn create_draft() -> PageDefinition {
    PageDefinition {
        id: None,
        heading: String::new(),
        inputs: Vec::new(),
        is_editing: true,
        is_new: true,
    }
}

/// Append a text field with a fresh id and an empty prompt.
pub fn add_field(mut page: PageDefinition) -> PageDefinition {
    page.inputs.push(InputFieldSpec::new_text());
    page
}

/// Remove a field by id. Removing an absent field is a no-op.
pub fn remove_field(mut page: PageDefinition, input_id: &FieldId) -> PageDefinition {
    page.inputs.retain(|f| &f.input_id != input_id);
    page
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Input ids the report already uses for its own keys.
pub const RESERVED_FIELD_IDS: [&str; 2] = [ROW_ID_KEY, EMAIL_FIELD];

/// Check every rule a page must satisfy before it may be saved.
///
/// The heading must be non-blank and there must be at least one field. Every
/// field needs a non-blank placeholder, a type, and an `inputId` that is
/// non-blank and not one of [`RESERVED_FIELD_IDS`].
pub fn validate_for_save(page: &PageDefinition) -> Result<(), CoreError> {
    if page.heading.trim().is_empty() {
        return Err(CoreError::Validation("Page heading is required".to_string()));
    }
    if page.inputs.is_empty() {
        return Err(CoreError::Validation(
            "A page needs at least one input field".to_string(),
        ));
    }
    for (i, field) in page.inputs.iter().enumerate() {
        if field.placeholder.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Input field {} is missing a placeholder",
                i + 1
            )));
        }
        if field.field_type.is_none() {
            return Err(CoreError::Validation(format!(
                "Input field {} is missing a type",
                i + 1
            )));
        }
        let input_id = field.input_id.as_str();
        if input_id.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Input field {} is missing an input id",
                i + 1
            )));
        }
        if RESERVED_FIELD_IDS.contains(&input_id) {
            return Err(CoreError::Validation(format!(
                "Input id '{input_id}' is reserved"
            )));
        }
    }
    Ok(())
}

/// Whether the save action is enabled for this page.
pub fn can_save(page: &PageDefinition) -> bool {
    validate_for_save(page).is_ok()
}

/// Reject pages whose fields share an `inputId`.
pub fn validate_unique_field_ids(page: &PageDefinition) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for field in &page.inputs {
        if !seen.insert(&field.input_id) {
            return Err(CoreError::Validation(format!(
                "Duplicate input id '{}' on page",
                field.input_id
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Persist a page: insert when new, otherwise update in place by id.
///
/// Returns the saved page with editing flags cleared. The input page is never
/// modified; callers replace their copy only on success.
pub async fn save(page: &PageDefinition, store: &dyn PageStore) -> Result<PageDefinition, CoreError> {
    validate_for_save(page)?;
    validate_unique_field_ids(page)?;

    let content = PageContent::from(page);
    match (&page.id, page.is_new) {
        (Some(id), false) => {
            let update = PageUpdate {
                heading: Some(content.heading.clone()),
                inputs: Some(content.inputs.clone()),
            };
            store.update_page(id, &update).await?;
            tracing::info!(page_id = %id, fields = content.inputs.len(), "Page updated");
            Ok(PageDefinition::persisted(id.clone(), content))
        }
        _ => {
            let saved = store.create_page(&content).await?;
            tracing::info!(
                page_id = ?saved.id,
                fields = saved.inputs.len(),
                "Page created"
            );
            Ok(saved)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
