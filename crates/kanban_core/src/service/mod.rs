//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ordering and store calls into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod card_service;
