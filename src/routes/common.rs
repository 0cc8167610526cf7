//! Operational routes. `/ready` checks both the provider setting and a live session.

use crate::sql::Statement;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Readiness {
    status: &'static str,
    database: &'static str,
    provider: &'static str,
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let provider = match state.settings.provider() {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "not ready: provider");
            "unconfigured"
        }
    };
    let database = match state.db.acquire().await {
        Ok(mut session) => match session.query(&Statement::new("SELECT 1")).await {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "not ready: SELECT 1 failed");
                "unavailable"
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "not ready: no session");
            "unavailable"
        }
    };
    let up = provider == "ok" && database == "ok";
    let status = if up { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(Readiness {
            status: if up { "ok" } else { "degraded" },
            database,
            provider,
        }),
    )
}

async fn info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "identifier_style": format!("{:?}", state.settings.identifier_style).to_lowercase(),
    }))
}

/// `/health` and `/version` never touch the database.
pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(info))
        .route("/info", get(info))
        .with_state(state)
}
