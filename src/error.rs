//! Typed errors, database error classification, and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// A failure reported by the database itself, carrying its native error code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{}", .code.as_deref().map(|c| format!(" (code {})", c)).unwrap_or_default())]
pub struct DbError {
    pub code: Option<String>,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("unsupported data type: {0}")]
    UnsupportedType(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Database(DbError),
    #[error("transport: {0}")]
    Transport(String),
    #[error("hashing: {0}")]
    Hashing(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db) => AppError::Database(DbError {
                code: db.code().map(|c| c.into_owned()),
                message: db.message().to_string(),
            }),
            other => AppError::Transport(other.to_string()),
        }
    }
}

/// What a database error code means to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    UndefinedObject,
    ForeignKeyViolation,
    UniqueViolation,
    Other,
}

impl DbErrorKind {
    /// PostgreSQL SQLSTATE codes.
    pub fn from_code(code: &str) -> Self {
        match code {
            "42P01" | "42703" => DbErrorKind::UndefinedObject,
            "23503" => DbErrorKind::ForeignKeyViolation,
            "23505" => DbErrorKind::UniqueViolation,
            _ => DbErrorKind::Other,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            DbErrorKind::UndefinedObject => StatusCode::NOT_FOUND,
            DbErrorKind::ForeignKeyViolation | DbErrorKind::UniqueViolation => StatusCode::CONFLICT,
            DbErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Externally visible outcome of a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

/// Label an error with a status and a single-line message. Never retries.
pub fn classify(err: &AppError) -> ErrorRecord {
    match err {
        AppError::Validation(_) | AppError::UnsupportedType(_) => ErrorRecord {
            status: StatusCode::BAD_REQUEST,
            code: "validation_error",
            message: err.to_string(),
        },
        AppError::BadRequest(_) => ErrorRecord {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: err.to_string(),
        },
        AppError::NotFound(_) => ErrorRecord {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: err.to_string(),
        },
        AppError::Conflict(_) => ErrorRecord {
            status: StatusCode::CONFLICT,
            code: "conflict",
            message: err.to_string(),
        },
        AppError::Database(db) => {
            let kind = db
                .code
                .as_deref()
                .map(DbErrorKind::from_code)
                .unwrap_or(DbErrorKind::Other);
            let status = kind.status();
            let code = match kind {
                DbErrorKind::UndefinedObject => "not_found",
                DbErrorKind::ForeignKeyViolation | DbErrorKind::UniqueViolation => "conflict",
                DbErrorKind::Other => "database_error",
            };
            ErrorRecord {
                status,
                code,
                message: format!("Error ({}): {}", status.as_u16(), db.message),
            }
        }
        AppError::Config(e) => internal("config_error", e),
        AppError::Transport(e) => internal("internal_error", e),
        AppError::Hashing(e) => internal("internal_error", e),
    }
}

fn internal(code: &'static str, e: &dyn std::fmt::Display) -> ErrorRecord {
    ErrorRecord {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code,
        message: format!("internal server error: {}", e),
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let record = classify(&self);
        if record.status.is_server_error() {
            tracing::error!(status = record.status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = record.status.as_u16(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: record.code,
                message: record.message,
            },
        };
        (record.status, Json(body)).into_response()
    }
}
