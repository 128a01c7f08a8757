//! Card use-case service.
//!
//! # Responsibility
//! - Provide list/create/update/reorder/delete entry points over validated
//!   requests.
//! - Be the only caller of the ordering engine.
//! - Classify every store failure into one database error kind.
//!
//! # Invariants
//! - `update` never changes status or order; `reorder` never changes title or
//!   description.
//! - Deletion is permanent.
//! - Log events carry ids and counts only, never titles or descriptions.

use crate::model::card::{now_millis, Card, CardId, ReorderItem};
use crate::ordering;
use crate::repo::card_repo::{CardStore, RepoError};
use crate::validation::{CreateCard, DeleteCard, ReorderCards, UpdateCard};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for card use-cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// Target card does not exist.
    NotFound(CardId),
    /// Any store-level failure.
    Database(RepoError),
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::Database(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Database(err) => Some(err),
        }
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Database(other),
        }
    }
}

pub type CardServiceResult<T> = Result<T, CardServiceError>;

/// Card service facade over a card store.
pub struct CardService<S: CardStore> {
    store: S,
}

impl<S: CardStore> CardService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists every card, newest first.
    pub fn list(&self) -> CardServiceResult<Vec<Card>> {
        Ok(self.store.list_cards()?)
    }

    /// Gets one card by id.
    pub fn get(&self, id: &str) -> CardServiceResult<Card> {
        self.store
            .get_card(id)?
            .ok_or_else(|| CardServiceError::NotFound(id.to_string()))
    }

    /// Creates a card at the end of its status partition.
    ///
    /// The order read and the insert are separate statements.
    pub fn create(&self, request: CreateCard) -> CardServiceResult<Card> {
        let order = ordering::assign_initial_order(&self.store, request.status)?;
        let card = Card::new(request.title, request.status, order, now_millis());
        self.store.insert_card(&card)?;

        info!(
            "event=card_create module=service status=ok card_id={} card_status={} order={}",
            card.id, card.status, card.order
        );
        Ok(card)
    }

    /// Replaces title and description of one card.
    pub fn update(&self, request: UpdateCard) -> CardServiceResult<Card> {
        let updated = self.store.update_content(
            &request.id,
            &request.title,
            request.description.as_deref(),
            now_millis(),
        )?;

        match updated {
            Some(card) => {
                info!(
                    "event=card_update module=service status=ok card_id={}",
                    card.id
                );
                Ok(card)
            }
            None => {
                warn!(
                    "event=card_update module=service status=not_found card_id={}",
                    request.id
                );
                Err(CardServiceError::NotFound(request.id))
            }
        }
    }

    /// Applies one reorder batch atomically.
    ///
    /// Returns the placement of each item in input order.
    pub fn reorder(&self, request: ReorderCards) -> CardServiceResult<Vec<ReorderItem>> {
        match ordering::reorder(&self.store, &request.items) {
            Ok(items) => {
                info!(
                    "event=card_reorder module=service status=ok items={}",
                    items.len()
                );
                Ok(items)
            }
            Err(err) => {
                warn!(
                    "event=card_reorder module=service status=rolled_back items={} error={}",
                    request.items.len(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Deletes one card permanently and returns its prior state.
    pub fn delete(&self, request: DeleteCard) -> CardServiceResult<Card> {
        match self.store.delete_card(&request.id)? {
            Some(card) => {
                info!(
                    "event=card_delete module=service status=ok card_id={}",
                    card.id
                );
                Ok(card)
            }
            None => Err(CardServiceError::NotFound(request.id)),
        }
    }
}
