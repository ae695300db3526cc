//! Flat tabular view of all submissions.
//!
//! Columns come from the current page definitions, so answers to fields
//! that no longer exist simply drop out of the report.

use indexmap::IndexMap;
use serde::Serialize;

use crate::page::{PageDefinition, NARROW_COLUMN_WIDTH};
use crate::submission::{Submission, EMAIL_FIELD};
use crate::types::FieldId;

/// Label of the leading email column.
pub const EMAIL_COLUMN_LABEL: &str = "Email";

/// Row key holding the row's position.
pub const ROW_ID_KEY: &str = "id";

/// Cell content when a submission has no answer for a column.
pub const MISSING_CELL: &str = "-";

/// Width for a column whose field has no type.
pub const DEFAULT_COLUMN_WIDTH: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportColumn {
    pub key: String,
    pub label: String,
    pub width_hint: u32,
}

/// One row per submission. `id` is the row's position, not a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: usize,
    #[serde(flatten)]
    pub cells: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<ReportRow>,
}

/// Build the column list: `email` first, then every distinct field id in
/// page order and field order. A repeated id keeps its first position and
/// label.
pub fn columns(pages: &[PageDefinition]) -> Vec<ReportColumn> {
    let mut columns: IndexMap<String, ReportColumn> = IndexMap::new();
    columns.insert(
        EMAIL_FIELD.to_string(),
        ReportColumn {
            key: EMAIL_FIELD.to_string(),
            label: EMAIL_COLUMN_LABEL.to_string(),
            width_hint: NARROW_COLUMN_WIDTH,
        },
    );

    for field in pages.iter().flat_map(|p| p.inputs.iter()) {
        columns
            .entry(field.input_id.to_string())
            .or_insert_with(|| ReportColumn {
                key: field.input_id.to_string(),
                label: field.placeholder.clone(),
                width_hint: field
                    .field_type
                    .map_or(DEFAULT_COLUMN_WIDTH, |t| t.width_hint()),
            });
    }

    columns.into_values().collect()
}

/// Project pages and submissions into a table.
pub fn project(pages: &[PageDefinition], submissions: &[Submission]) -> Report {
    let columns = columns(pages);
    let rows = submissions
        .iter()
        .enumerate()
        .map(|(i, submission)| ReportRow {
            id: i + 1,
            cells: columns
                .iter()
                .map(|col| {
                    let value = submission
                        .find_value(&FieldId(col.key.clone()))
                        .unwrap_or(MISSING_CELL);
                    (col.key.clone(), value.to_string())
                })
                .collect(),
        })
        .collect();

    Report { columns, rows }
}
