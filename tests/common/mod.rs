//! Scripted in-memory connection service for driving the router without PostgreSQL.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use entity_gateway::{
    app, AppError, AppState, BcryptHasher, ConnectionService, DbError, EntityRow, Session, Settings, SqlValue,
    Statement,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub enum Reply {
    Rows(Vec<EntityRow>),
    Affected(u64),
    Fail(DbError),
}

#[derive(Default)]
struct Inner {
    replies: Mutex<VecDeque<Reply>>,
    executed: Mutex<Vec<Statement>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Answers statements from a queue of replies, in order, and records every statement it receives.
#[derive(Clone, Default)]
pub struct ScriptedDatabase {
    inner: Arc<Inner>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, reply: Reply) -> &Self {
        self.inner.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn rows(&self, rows: Vec<EntityRow>) -> &Self {
        self.reply(Reply::Rows(rows))
    }

    /// Catalog answer for a column type lookup.
    pub fn column_type(&self, data_type: &str) -> &Self {
        self.rows(vec![row(vec![("data_type", SqlValue::Text(data_type.into()))])])
    }

    pub fn fail(&self, code: &str, message: &str) -> &Self {
        self.reply(Reply::Fail(DbError {
            code: Some(code.into()),
            message: message.into(),
        }))
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.inner.executed.lock().unwrap().clone()
    }

    pub fn acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }
}

struct ScriptedSession {
    inner: Arc<Inner>,
}

impl ScriptedSession {
    fn next(&self, stmt: &Statement) -> Result<Reply, AppError> {
        self.inner.executed.lock().unwrap().push(stmt.clone());
        self.inner
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Transport(format!("no scripted reply for: {}", stmt.sql)))
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn query(&mut self, stmt: &Statement) -> Result<Vec<EntityRow>, AppError> {
        match self.next(stmt)? {
            Reply::Rows(rows) => Ok(rows),
            Reply::Affected(_) => Err(AppError::Transport("scripted an affected count for a query".into())),
            Reply::Fail(e) => Err(AppError::Database(e)),
        }
    }

    async fn execute(&mut self, stmt: &Statement) -> Result<u64, AppError> {
        match self.next(stmt)? {
            Reply::Affected(n) => Ok(n),
            Reply::Rows(rows) => Ok(rows.len() as u64),
            Reply::Fail(e) => Err(AppError::Database(e)),
        }
    }
}

#[async_trait]
impl ConnectionService for ScriptedDatabase {
    async fn acquire(&self) -> Result<Box<dyn Session>, AppError> {
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            inner: self.inner.clone(),
        }))
    }
}

pub fn row(fields: Vec<(&str, SqlValue)>) -> EntityRow {
    fields.into_iter().collect()
}

pub fn settings_with_provider(provider: Option<&str>) -> Settings {
    Settings {
        database_provider: provider.map(str::to_string),
        ..Settings::default()
    }
}

pub fn state(db: &ScriptedDatabase, settings: Settings) -> AppState {
    AppState {
        db: Arc::new(db.clone()),
        settings: Arc::new(settings),
        hasher: Arc::new(BcryptHasher::new(4)),
    }
}

pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
    app(state).oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
