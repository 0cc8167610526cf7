//! CrudService plus the coercion and credential steps it runs.

pub mod coercion;
pub mod credentials;
mod crud;
pub use coercion::{coerce, decode_entity, decode_json};
pub use credentials::{protect_credentials, BcryptHasher, CredentialHasher, CREDENTIAL_TOKENS};
pub use crud::CrudService;
