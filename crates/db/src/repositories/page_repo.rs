//! Repository for the `pages` table.

use onboard_core::page::{PageContent, PageUpdate};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::page::PageRow;

/// Column list for `pages` queries.
const COLUMNS: &str = "id, position, heading, inputs, created_at, updated_at";

/// Provides CRUD operations for page definitions.
pub struct PageRepo;

impl PageRepo {
    /// List all pages in creation order.
    pub async fn list(pool: &PgPool) -> Result<Vec<PageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages ORDER BY position ASC");
        sqlx::query_as::<_, PageRow>(&query).fetch_all(pool).await
    }

    /// Insert a new page under the given id.
    pub async fn create(
        pool: &PgPool,
        id: &str,
        content: &PageContent,
    ) -> Result<PageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (id, heading, inputs) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .bind(&content.heading)
            .bind(Json(&content.inputs))
            .fetch_one(pool)
            .await
    }

    /// Patch a page. Only non-`None` fields are applied.
    ///
    /// Returns `None` when no page has the given id.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        update: &PageUpdate,
    ) -> Result<Option<PageRow>, sqlx::Error> {
        let query = format!(
            "UPDATE pages SET \
                heading = COALESCE($2, heading), \
                inputs = COALESCE($3, inputs), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .bind(update.heading.as_deref())
            .bind(update.inputs.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Delete a page. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
