//! Core domain logic for the kanban card board.
//! This crate is the single source of truth for card and ordering invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;
pub mod validation;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{Card, CardId, CardStatus, ReorderItem};
pub use repo::card_repo::{CardStore, RepoError, RepoResult, SqliteCardRepository};
pub use service::card_service::{CardService, CardServiceError, CardServiceResult};
pub use validation::{
    validate_delete, CreateCard, CreateCardInput, DeleteCard, ReorderCards, ReorderCardsInput,
    ReorderItemInput, UpdateCard, UpdateCardInput, ValidationError, ValidationIssue,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
