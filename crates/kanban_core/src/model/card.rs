//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical card record and its status partitions.
//! - Define the `{id, status, order}` placement projection used by reorder.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `order >= 1`; uniqueness is only meaningful within one status.
//! - `updated_at >= created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque card identifier.
///
/// Generated as a UUID v4 string, but callers must not rely on its format.
pub type CardId = String;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 255;

/// Smallest valid order value inside a status partition.
pub const MIN_ORDER: i64 = 1;

/// Largest order a client may request; orders are 32-bit on the wire.
pub const MAX_ORDER: i64 = i32::MAX as i64;

/// Board column a card belongs to.
///
/// Any status may move to any other status through reorder; there is no
/// transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardStatus {
    Todo,
    Doing,
    Done,
}

impl CardStatus {
    pub const ALL: [CardStatus; 3] = [CardStatus::Todo, CardStatus::Doing, CardStatus::Done];

    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Doing => "DOING",
            Self::Done => "DONE",
        }
    }

    /// Parses the exact wire representation; matching is case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TODO" => Some(Self::Todo),
            "DOING" => Some(Self::Doing),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Display for CardStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical card record as persisted by the card store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    /// Serialized as `null` when absent.
    pub description: Option<String>,
    pub status: CardStatus,
    /// Position inside the `status` partition.
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a new card with a generated id and no description.
    ///
    /// Both timestamps are set to `now`.
    pub fn new(title: impl Into<String>, status: CardStatus, order: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            status,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the `{id, status, order}` projection of this card.
    pub fn placement(&self) -> ReorderItem {
        ReorderItem {
            id: self.id.clone(),
            status: self.status,
            order: self.order,
        }
    }
}

/// One entry of a reorder batch, and the projection returned for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    pub id: CardId,
    pub status: CardStatus,
    pub order: i64,
}

/// Current UTC time truncated to millisecond precision.
///
/// Storage keeps epoch milliseconds, so truncating up front keeps returned
/// records equal to what a later read yields.
pub fn now_millis() -> DateTime<Utc> {
    from_epoch_millis(Utc::now().timestamp_millis()).unwrap_or_else(Utc::now)
}

/// Converts epoch milliseconds into a UTC timestamp.
pub fn from_epoch_millis(value: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
}
