//! Page definition row.

use onboard_core::page::{InputFieldSpec, PageContent, PageDefinition};
use onboard_core::types::{PageId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `pages` table.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub id: String,
    pub position: i64,
    pub heading: String,
    pub inputs: Json<Vec<InputFieldSpec>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PageRow> for PageDefinition {
    fn from(row: PageRow) -> Self {
        PageDefinition::persisted(
            PageId(row.id),
            PageContent {
                heading: row.heading,
                inputs: row.inputs.0,
            },
        )
    }
}
