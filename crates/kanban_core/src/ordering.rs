//! Per-status ordering engine.
//!
//! # Responsibility
//! - Assign the initial `order` of a new card inside its status partition.
//! - Apply client-computed reorder batches atomically.
//!
//! # Invariants
//! - Initial order is `max(order in status) + 1`, or `1` for an empty status.
//! - A reorder batch is applied entirely or not at all.
//! - Reorder results keep the input sequence; nothing is re-derived or
//!   re-sorted server-side.
//! - Duplicate orders inside one status are persisted as given.

use crate::model::card::{now_millis, CardStatus, ReorderItem, MIN_ORDER};
use crate::repo::card_repo::{CardStore, RepoError, RepoResult};
use log::debug;

/// Returns the order a new card in `status` should receive.
///
/// Only reads from the store. Not transactional with the insert that
/// follows, so two concurrent creates may receive the same value.
///
/// # Errors
/// - `RepoError::InvalidData` when the partition max has no successor.
pub fn assign_initial_order<S: CardStore>(store: &S, status: CardStatus) -> RepoResult<i64> {
    match store.max_order(status)? {
        Some(max) => max.checked_add(1).ok_or_else(|| {
            RepoError::InvalidData(format!("order {max} in status {status} has no successor"))
        }),
        None => Ok(MIN_ORDER),
    }
}

/// Moves every referenced card to the given status and order.
///
/// # Errors
/// - `RepoError::NotFound` for the first unknown id; the batch is rolled
///   back and no item is applied.
/// - Store-level errors are propagated unchanged.
pub fn reorder<S: CardStore>(store: &S, items: &[ReorderItem]) -> RepoResult<Vec<ReorderItem>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let now = now_millis();
    let placed = store.atomically(|tx| {
        items
            .iter()
            .map(|item| {
                tx.update_placement(&item.id, item.status, item.order, now)?
                    .map(|card| card.placement())
                    .ok_or_else(|| RepoError::NotFound(item.id.clone()))
            })
            .collect::<RepoResult<Vec<_>>>()
    })?;

    debug!(
        "event=card_reorder module=ordering status=ok items={}",
        placed.len()
    );
    Ok(placed)
}
