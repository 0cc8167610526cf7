//! Entity routes under /api/:project/:table. The project segment is accepted and ignored.

use crate::handlers::entity::{create, list, read_by_key};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/:project/:table", get(list).post(create))
        .route("/api/:project/:table/:key/:value", get(read_by_key))
        .with_state(state)
}
