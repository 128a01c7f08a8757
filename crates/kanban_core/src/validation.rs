//! Request shapes and pure validation for card operations.
//!
//! # Responsibility
//! - Define the raw (all-optional) input shape of each operation as it
//!   arrives from the wire.
//! - Convert raw inputs into typed requests, or collect every problem found.
//!
//! # Invariants
//! - Validation is pure: no I/O, no logging, no clock.
//! - A typed request value always satisfies the card model rules, so the
//!   service never re-checks them.

use crate::model::card::{CardId, CardStatus, ReorderItem, MAX_ORDER, MIN_ORDER, TITLE_MAX_CHARS};
use serde::{Deserialize, Deserializer};
use serde_json::Number;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One failed rule, addressed by a dotted field path such as `items.2.order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Input rejected before it reaches the card service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Creates an error holding a single issue.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validation Error")?;
        for (index, issue) in self.issues.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Validated input of `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCard {
    pub title: String,
    pub status: CardStatus,
}

/// Validated input of `update`. `description: None` clears the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCard {
    pub id: CardId,
    pub title: String,
    pub description: Option<String>,
}

/// Validated input of `reorder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderCards {
    pub items: Vec<ReorderItem>,
}

/// Validated input of `delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCard {
    pub id: CardId,
}

/// Raw body of `POST /api/cards`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCardInput {
    pub title: Option<String>,
    pub status: Option<String>,
}

/// Raw body of `PATCH /api/cards/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCardInput {
    pub title: Option<String>,
    /// Outer `None`: key absent. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

/// Raw body of `PATCH /api/cards`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderCardsInput {
    pub items: Option<Vec<ReorderItemInput>>,
}

/// Raw reorder batch entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderItemInput {
    pub id: Option<String>,
    pub status: Option<String>,
    /// Kept as a raw JSON number: integers stay exact and fractional values
    /// get their own message.
    pub order: Option<Number>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl CreateCardInput {
    pub fn validate(self) -> Result<CreateCard, ValidationError> {
        let mut issues = Issues::default();
        let title = issues.title("title", self.title);
        let status = issues.status("status", self.status.as_deref());
        issues.finish()?;

        match (title, status) {
            (Some(title), Some(status)) => Ok(CreateCard { title, status }),
            _ => Err(ValidationError::single("body", "Invalid input")),
        }
    }
}

impl UpdateCardInput {
    pub fn validate(self, id: Option<&str>) -> Result<UpdateCard, ValidationError> {
        let mut issues = Issues::default();
        let id = issues.id("id", id);
        let title = issues.title("title", self.title);
        if self.description.is_none() {
            issues.push("description", "Required");
        }
        issues.finish()?;

        match (id, title, self.description) {
            (Some(id), Some(title), Some(description)) => Ok(UpdateCard {
                id,
                title,
                description,
            }),
            _ => Err(ValidationError::single("body", "Invalid input")),
        }
    }
}

impl ReorderCardsInput {
    pub fn validate(self) -> Result<ReorderCards, ValidationError> {
        let Some(raw_items) = self.items else {
            return Err(ValidationError::single("items", "Required"));
        };

        let mut issues = Issues::default();
        let mut items = Vec::with_capacity(raw_items.len());
        for (index, raw) in raw_items.into_iter().enumerate() {
            let id = issues.id(&format!("items.{index}.id"), raw.id.as_deref());
            let status = issues.status(&format!("items.{index}.status"), raw.status.as_deref());
            let order = issues.order(&format!("items.{index}.order"), raw.order);
            if let (Some(id), Some(status), Some(order)) = (id, status, order) {
                items.push(ReorderItem { id, status, order });
            }
        }
        issues.finish()?;

        Ok(ReorderCards { items })
    }
}

/// Validates the path parameter of `DELETE /api/cards/{id}`.
pub fn validate_delete(id: Option<&str>) -> Result<DeleteCard, ValidationError> {
    let mut issues = Issues::default();
    let id = issues.id("id", id);
    issues.finish()?;
    id.map(|id| DeleteCard { id })
        .ok_or_else(|| ValidationError::single("id", "Id is required"))
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(ValidationIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }

    /// Ids are used exactly as sent; only blank values are rejected.
    fn id(&mut self, field: &str, value: Option<&str>) -> Option<CardId> {
        match value {
            Some(id) if !id.trim().is_empty() => Some(id.to_string()),
            _ => {
                self.push(field, "Id is required");
                None
            }
        }
    }

    fn title(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let Some(title) = value else {
            self.push(field, "Title is required");
            return None;
        };
        let length = title.chars().count();
        if length < 1 {
            self.push(field, "String must contain at least 1 character(s)");
            return None;
        }
        if length > TITLE_MAX_CHARS {
            self.push(field, "Title is long");
            return None;
        }
        Some(title)
    }

    fn status(&mut self, field: &str, value: Option<&str>) -> Option<CardStatus> {
        let Some(value) = value else {
            self.push(field, "Required");
            return None;
        };
        let status = CardStatus::parse(value);
        if status.is_none() {
            self.push(
                field,
                format!("Invalid enum value. Expected 'TODO' | 'DOING' | 'DONE', received '{value}'"),
            );
        }
        status
    }

    fn order(&mut self, field: &str, value: Option<Number>) -> Option<i64> {
        let Some(value) = value else {
            self.push(field, "Required");
            return None;
        };
        // Values beyond i64 saturate so the range check reports them.
        let order = match (value.as_i64(), value.as_u64(), value.as_f64()) {
            (Some(order), _, _) => order,
            (None, Some(_), _) => i64::MAX,
            (None, None, Some(float)) if float.fract() == 0.0 => float as i64,
            _ => {
                self.push(field, "Expected integer, received float");
                return None;
            }
        };
        if order < MIN_ORDER {
            self.push(field, "Number must be greater than or equal to 1");
            return None;
        }
        if order > MAX_ORDER {
            self.push(field, format!("Number must be less than or equal to {MAX_ORDER}"));
            return None;
        }
        Some(order)
    }
}
