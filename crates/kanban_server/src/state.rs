//! Shared handler state.
//!
//! # Invariants
//! - State holds configuration only; card data lives in the database and
//!   every request works on its own connection.

use axum::http::HeaderValue;
use kanban_core::db::open_db_url;
use kanban_core::{CardService, CardServiceResult, SqliteCardRepository};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ApiError, ApiResult, ErrorTranslator};

#[derive(Debug, Clone)]
pub struct AppState {
    database_url: Arc<str>,
    client_origin: HeaderValue,
    translator: ErrorTranslator,
}

impl AppState {
    pub fn new(
        database_url: impl Into<Arc<str>>,
        client_origin: HeaderValue,
        translator: ErrorTranslator,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            client_origin,
            translator,
        }
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let client_origin = HeaderValue::from_str(&config.client_url)
            .map_err(|err| ApiError::Internal(format!("invalid CLIENT_URL: {err}")))?;
        Ok(Self::new(
            config.database_url.as_str(),
            client_origin,
            ErrorTranslator::new(config.environment),
        ))
    }

    pub fn client_origin(&self) -> &HeaderValue {
        &self.client_origin
    }

    pub fn translator(&self) -> ErrorTranslator {
        self.translator
    }

    /// Runs `op` against a fresh card service on the blocking pool.
    ///
    /// The connection is opened, used and dropped inside the worker.
    pub async fn with_cards<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&CardService<SqliteCardRepository<'conn>>) -> CardServiceResult<T>
            + Send
            + 'static,
    {
        let database_url = Arc::clone(&self.database_url);
        tokio::task::spawn_blocking(move || -> ApiResult<T> {
            let conn = open_db_url(&database_url)?;
            let repo = SqliteCardRepository::try_new(&conn)
                .map_err(|err| ApiError::Database(err.to_string()))?;
            let service = CardService::new(repo);
            Ok(op(&service)?)
        })
        .await?
    }
}
