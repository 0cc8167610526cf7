//! Password-like fields are hashed before an entity is persisted.

use crate::error::AppError;
use crate::sql::{EntityRow, SqlValue};

/// Field-name fragments that mark a credential column. Matched case-insensitively.
pub const CREDENTIAL_TOKENS: &[&str] = &["password", "contrasena", "passw", "clave"];

/// One-way salted hashing of credentials.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AppError>;

    /// Whether a stored value already has this hasher's output shape.
    fn is_hash(&self, value: &str) -> bool;
}

#[derive(Clone, Debug)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        BcryptHasher { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        BcryptHasher::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| AppError::Hashing(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AppError> {
        bcrypt::verify(plaintext, hash).map_err(|e| AppError::Hashing(e.to_string()))
    }

    fn is_hash(&self, value: &str) -> bool {
        value.len() == 60
            && ["$2a$", "$2b$", "$2x$", "$2y$"]
                .iter()
                .any(|prefix| value.starts_with(prefix))
    }
}

pub fn is_credential_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    CREDENTIAL_TOKENS.iter().any(|token| lower.contains(token))
}

/// First field, in entity order, whose name contains a credential token.
pub fn credential_field(entity: &EntityRow) -> Option<&str> {
    entity.names().find(|name| is_credential_name(name))
}

/// Hash the first credential field when it holds non-empty plaintext.
/// At most one field is rewritten; non-text and already-hashed values are kept.
pub fn protect_credentials(mut entity: EntityRow, hasher: &dyn CredentialHasher) -> Result<EntityRow, AppError> {
    let Some(field) = credential_field(&entity).map(str::to_string) else {
        return Ok(entity);
    };
    let plaintext = match entity.get(&field) {
        Some(SqlValue::Text(s)) if !s.is_empty() && !hasher.is_hash(s) => s.clone(),
        _ => return Ok(entity),
    };
    let hashed = hasher.hash(&plaintext)?;
    entity.insert(field.as_str(), SqlValue::Text(hashed));
    tracing::debug!(field = %field, "credential field hashed");
    Ok(entity)
}
