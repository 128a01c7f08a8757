//! Card store contract and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract consumed by ordering and services.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Store APIs report missing rows as `None`; callers decide whether that
//!   is a not-found condition.
//! - All multi-statement writes go through `CardStore::atomically`.

pub mod card_repo;
