//! Card board domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by ordering and service logic.
//!
//! # Invariants
//! - Every card is identified by a stable, opaque `CardId`.
//! - Deletion is permanent; there are no tombstones.

pub mod card;
