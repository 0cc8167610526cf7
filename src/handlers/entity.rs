//! Entity handlers: list a table, look rows up by one column, create a row.

use crate::error::AppError;
use crate::response::{created, key_matches, table_rows};
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

fn require(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// GET /api/:project/:table
pub async fn list(
    State(state): State<AppState>,
    Path((project, table)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    require(&table, "table name")?;
    tracing::debug!(project = %project, table = %table, "list");
    let builder = state.statement_builder()?;
    let rows = CrudService::list(state.db.as_ref(), &builder, &table).await?;
    Ok(table_rows(&table, rows))
}

/// GET /api/:project/:table/:key/:value
pub async fn read_by_key(
    State(state): State<AppState>,
    Path((project, table, key, value)): Path<(String, String, String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if table.trim().is_empty() || key.trim().is_empty() || value.trim().is_empty() {
        return Err(AppError::BadRequest(
            "table name, key name and value must not be empty".into(),
        ));
    }
    tracing::debug!(project = %project, table = %table, key = %key, "read by key");
    let builder = state.statement_builder()?;
    let rows = CrudService::find_by_key(state.db.as_ref(), &builder, &table, &key, &value).await?;
    Ok(key_matches(&table, &key, rows))
}

/// POST /api/:project/:table
pub async fn create(
    State(state): State<AppState>,
    Path((project, table)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    require(&table, "table name")?;
    let Json(body) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let body = match body {
        Value::Object(m) if !m.is_empty() => m,
        Value::Object(_) => return Err(AppError::BadRequest("entity data must not be empty".into())),
        _ => return Err(AppError::BadRequest("body must be a JSON object".into())),
    };
    tracing::debug!(project = %project, table = %table, fields = body.len(), "create");
    let builder = state.statement_builder()?;
    let rows_affected = CrudService::create(state.db.as_ref(), &builder, state.hasher.clone(), &table, &body).await?;
    Ok(created(&table, rows_affected))
}
