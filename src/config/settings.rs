//! Runtime settings read from the environment (or any string lookup).

use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/entity_gateway";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Active database provider. Decides placeholder syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatabaseProvider {
    Postgres,
}

impl DatabaseProvider {
    /// Placeholder text for the 1-based parameter position.
    pub fn placeholder(self, position: usize) -> String {
        match self {
            DatabaseProvider::Postgres => format!("${}", position),
        }
    }
}

impl FromStr for DatabaseProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseProvider::Postgres),
            _ => Err(ConfigError::Invalid {
                key: "DATABASE_PROVIDER",
                value: s.to_string(),
            }),
        }
    }
}

/// How caller-supplied table and column names are written into statement text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentifierStyle {
    /// Interpolated exactly as received.
    #[default]
    Verbatim,
    /// Double-quoted, embedded quotes doubled.
    Quoted,
}

impl FromStr for IdentifierStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbatim" => Ok(IdentifierStyle::Verbatim),
            "quoted" => Ok(IdentifierStyle::Quoted),
            _ => Err(ConfigError::Invalid {
                key: "IDENTIFIER_STYLE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// Raw provider identifier; resolved per request by [`Settings::provider`].
    pub database_provider: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub identifier_style: IdentifierStyle,
    pub body_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            database_provider: None,
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.into()],
            bcrypt_cost: bcrypt::DEFAULT_COST,
            identifier_style: IdentifierStyle::Verbatim,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl Settings {
    /// Load from process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(v) => {
                let cost: u32 = parse_number("BCRYPT_COST", &v)?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid { key: "BCRYPT_COST", value: v });
                }
                cost
            }
            None => defaults.bcrypt_cost,
        };

        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            database_provider: get("DATABASE_PROVIDER"),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: get("DB_MAX_CONNECTIONS")
                .map(|v| parse_number::<u32>("DB_MAX_CONNECTIONS", &v))
                .transpose()?
                .unwrap_or(defaults.max_connections),
            allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            bcrypt_cost,
            identifier_style: get("IDENTIFIER_STYLE")
                .map(|v| v.parse::<IdentifierStyle>())
                .transpose()?
                .unwrap_or_default(),
            body_limit_bytes: get("BODY_LIMIT_BYTES")
                .map(|v| parse_number::<usize>("BODY_LIMIT_BYTES", &v))
                .transpose()?
                .unwrap_or(defaults.body_limit_bytes),
        })
    }

    /// The configured provider. Missing or unknown is a configuration error.
    pub fn provider(&self) -> Result<DatabaseProvider, ConfigError> {
        self.database_provider
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_PROVIDER"))?
            .parse()
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
