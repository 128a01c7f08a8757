//! Process configuration loaded from environment variables.
//!
//! # Responsibility
//! - Read `.env` (when present) and the process environment once at startup.
//! - Fail fast with a typed error when a required variable is missing or
//!   malformed.
//!
//! # Invariants
//! - Nothing downstream reads the process environment; the loaded `Config`
//!   is passed explicitly.

use axum::http::HeaderValue;
use kanban_core::db::{parse_db_url, DbLocation};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Deployment environment, taken from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!(
                "expected development, production or test, got `{other}`"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port (`PORT`).
    pub port: u16,
    /// Database used by request handlers (`DATABASE_URL`).
    pub database_url: String,
    /// Database used once at startup to run migrations (`DIRECT_URL`).
    pub direct_url: String,
    /// Allowed CORS origin (`CLIENT_URL`).
    pub client_url: String,
    pub environment: Environment,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = required("PORT")?
            .parse::<u16>()
            .map_err(|err| ConfigError::Invalid {
                name: "PORT",
                reason: err.to_string(),
            })?;

        let database_url = required("DATABASE_URL")?;
        match parse_db_url(&database_url) {
            Ok(DbLocation::File(_)) => {}
            Ok(DbLocation::Memory) => {
                return Err(ConfigError::Invalid {
                    name: "DATABASE_URL",
                    reason: "in-memory databases are not shared between requests".to_string(),
                })
            }
            Err(err) => {
                return Err(ConfigError::Invalid {
                    name: "DATABASE_URL",
                    reason: err.to_string(),
                })
            }
        }

        let direct_url = required("DIRECT_URL")?;
        parse_db_url(&direct_url).map_err(|err| ConfigError::Invalid {
            name: "DIRECT_URL",
            reason: err.to_string(),
        })?;

        let client_url = required("CLIENT_URL")?;
        HeaderValue::from_str(&client_url).map_err(|err| ConfigError::Invalid {
            name: "CLIENT_URL",
            reason: err.to_string(),
        })?;

        let environment = required("NODE_ENV")?
            .parse::<Environment>()
            .map_err(|reason| ConfigError::Invalid {
                name: "NODE_ENV",
                reason,
            })?;

        let log_dir = optional("LOG_DIR");
        if let Some(dir) = log_dir.as_deref() {
            if !Path::new(dir).is_absolute() {
                return Err(ConfigError::Invalid {
                    name: "LOG_DIR",
                    reason: "must be an absolute path".to_string(),
                });
            }
        }

        Ok(Self {
            port,
            database_url,
            direct_url,
            client_url,
            environment,
            log_level: optional("LOG_LEVEL"),
            log_dir,
        })
    }

    /// Effective log level: `LOG_LEVEL`, or the build-profile default.
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(kanban_core::default_log_level())
    }
}
