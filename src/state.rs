//! Shared application state for all routes.

use crate::config::Settings;
use crate::db::ConnectionService;
use crate::error::AppError;
use crate::service::CredentialHasher;
use crate::sql::StatementBuilder;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn ConnectionService>,
    pub settings: Arc<Settings>,
    pub hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    /// Builder for the configured provider. Read per request so a missing provider surfaces as a 500.
    pub fn statement_builder(&self) -> Result<StatementBuilder, AppError> {
        let provider = self.settings.provider()?;
        Ok(StatementBuilder::new(provider, self.settings.identifier_style))
    }
}
