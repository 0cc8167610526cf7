//! Server entry point: settings from env, Postgres pool, router.

use entity_gateway::{app, AppState, BcryptHasher, PgConnectionService, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("entity_gateway=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    if let Err(e) = settings.provider() {
        tracing::warn!("{}; entity routes will answer 500 until it is set", e);
    }

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_lazy(&settings.database_url)?;

    let state = AppState {
        db: Arc::new(PgConnectionService::new(pool)),
        hasher: Arc::new(BcryptHasher::new(settings.bcrypt_cost)),
        settings: Arc::new(settings.clone()),
    };

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
