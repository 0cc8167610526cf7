//! Entity gateway: schema-driven CRUD over caller-named PostgreSQL tables.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{DatabaseProvider, IdentifierStyle, Settings};
pub use db::{ConnectionService, PgConnectionService, Session};
pub use error::{classify, AppError, ConfigError, DbError, ErrorRecord};
pub use routes::{common_routes_with_ready, entity_routes};
pub use schema::{resolve_column_type, ColumnDescriptor, TypeTag};
pub use service::{BcryptHasher, CredentialHasher, CrudService};
pub use sql::{EntityRow, SqlValue, Statement, StatementBuilder, TypedParameter};
pub use state::AppState;

use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Full application router: common routes, entity routes, CORS and body limit layers.
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();
    let origins: Vec<axum::http::HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<axum::http::HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(entity_routes(state))
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(cors)
}
