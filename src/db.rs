//! Database access: a pooled session is checked out per request and returned on drop.

use crate::error::AppError;
use crate::sql::{decode_row, EntityRow, Statement};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

/// One open connection, valid for the lifetime of a request.
#[async_trait]
pub trait Session: Send {
    async fn query(&mut self, stmt: &Statement) -> Result<Vec<EntityRow>, AppError>;

    /// Returns the number of affected rows.
    async fn execute(&mut self, stmt: &Statement) -> Result<u64, AppError>;
}

/// Process-wide source of sessions.
#[async_trait]
pub trait ConnectionService: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Session>, AppError>;
}

#[derive(Clone)]
pub struct PgConnectionService {
    pool: PgPool,
}

impl PgConnectionService {
    pub fn new(pool: PgPool) -> Self {
        PgConnectionService { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionService for PgConnectionService {
    async fn acquire(&self) -> Result<Box<dyn Session>, AppError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession { conn }))
    }
}

pub struct PgSession {
    conn: PoolConnection<Postgres>,
}

/// Statements are never cached on the connection: the same SQL text is reused with
/// parameters of different types, and a cached statement keeps its first types.
fn prepare(stmt: &Statement) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query(&stmt.sql).persistent(false);
    for p in &stmt.params {
        query = query.bind(p.value.clone());
    }
    query
}

fn log_statement(stmt: &Statement) {
    let params: Vec<String> = stmt
        .params
        .iter()
        .map(|p| format!("{} = {:?} ({})", p.name, p.value, p.db_type()))
        .collect();
    tracing::debug!(sql = %stmt.sql, params = ?params, "query");
}

#[async_trait]
impl Session for PgSession {
    async fn query(&mut self, stmt: &Statement) -> Result<Vec<EntityRow>, AppError> {
        log_statement(stmt);
        let rows = prepare(stmt).fetch_all(&mut *self.conn).await?;
        Ok(rows.iter().map(decode_row).collect())
    }

    async fn execute(&mut self, stmt: &Statement) -> Result<u64, AppError> {
        log_statement(stmt);
        let done = prepare(stmt).execute(&mut *self.conn).await?;
        Ok(done.rows_affected())
    }
}
