//! Success bodies for entity requests.

use crate::sql::EntityRow;
use axum::Json;
use serde::Serialize;

/// Rows read from one table: `{"data": [...], "meta": {"table", "count", "key"?}}`.
#[derive(Serialize)]
pub struct RowSet {
    pub data: Vec<EntityRow>,
    pub meta: RowSetMeta,
}

#[derive(Serialize)]
pub struct RowSetMeta {
    pub table: String,
    pub count: usize,
    /// Column the rows were matched on, for keyed lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// `{"data": {"message", "table", "rows_affected"}}`
#[derive(Serialize)]
pub struct CreatedBody {
    pub data: Created,
}

#[derive(Serialize)]
pub struct Created {
    pub message: &'static str,
    pub table: String,
    pub rows_affected: u64,
}

pub fn table_rows(table: &str, rows: Vec<EntityRow>) -> Json<RowSet> {
    row_set(table, None, rows)
}

pub fn key_matches(table: &str, key: &str, rows: Vec<EntityRow>) -> Json<RowSet> {
    row_set(table, Some(key), rows)
}

fn row_set(table: &str, key: Option<&str>, rows: Vec<EntityRow>) -> Json<RowSet> {
    Json(RowSet {
        meta: RowSetMeta {
            table: table.to_string(),
            count: rows.len(),
            key: key.map(str::to_string),
        },
        data: rows,
    })
}

pub fn created(table: &str, rows_affected: u64) -> Json<CreatedBody> {
    Json(CreatedBody {
        data: Created {
            message: "entity created",
            table: table.to_string(),
            rows_affected,
        },
    })
}
