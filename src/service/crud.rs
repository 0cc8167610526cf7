//! Listing, keyed lookup, and insert against caller-named tables.

use super::coercion::{coerce, decode_entity};
use super::credentials::{protect_credentials, CredentialHasher};
use crate::db::ConnectionService;
use crate::error::AppError;
use crate::schema::resolve_column_type;
use crate::sql::{EntityRow, StatementBuilder};
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct CrudService;

impl CrudService {
    /// Every row of `table`. An empty table is an empty list, not an error.
    pub async fn list(
        db: &dyn ConnectionService,
        builder: &StatementBuilder,
        table: &str,
    ) -> Result<Vec<EntityRow>, AppError> {
        let stmt = builder.select_all(table);
        let mut session = db.acquire().await?;
        session.query(&stmt).await
    }

    /// Rows where `key` equals `raw`, after coercing `raw` to the column's declared type.
    /// The column type is looked up in the catalog on every call.
    pub async fn find_by_key(
        db: &dyn ConnectionService,
        builder: &StatementBuilder,
        table: &str,
        key: &str,
        raw: &str,
    ) -> Result<Vec<EntityRow>, AppError> {
        let mut session = db.acquire().await?;
        let column = resolve_column_type(session.as_mut(), builder, table, key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("could not determine data type of {}.{}", table, key)))?;
        let value = coerce(raw, &column.declared_type)?;
        let stmt = builder.select_by_key(table, key, value);
        let rows = session.query(&stmt).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!("no rows in {} where {} = {}", table, key, raw)));
        }
        Ok(rows)
    }

    /// Insert one row built from a JSON object. Credential fields are hashed first.
    /// Returns the affected row count.
    pub async fn create(
        db: &dyn ConnectionService,
        builder: &StatementBuilder,
        hasher: Arc<dyn CredentialHasher>,
        table: &str,
        body: &Map<String, Value>,
    ) -> Result<u64, AppError> {
        let entity = decode_entity(body);
        let entity = tokio::task::spawn_blocking(move || protect_credentials(entity, hasher.as_ref()))
            .await
            .map_err(|e| AppError::Hashing(format!("task join error: {}", e)))??;
        let stmt = builder.insert(table, &entity);
        let mut session = db.acquire().await?;
        session.execute(&stmt).await
    }
}
