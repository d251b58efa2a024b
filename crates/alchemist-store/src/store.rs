//! The persistence boundary.
//!
//! The engine never performs I/O. A [`GameStore`] supplies the catalog seed
//! and the player save, and accepts the player state back after each
//! committed operation. Loading and saving may be asynchronous; the caller
//! never overlaps a save with another mutation of the same state.

use std::future::Future;

use alchemist_engine::{CatalogSeed, PlayerState};

use crate::error::StoreError;

/// Source of the catalog and home of one player's save slot.
pub trait GameStore: Send + Sync {
    /// Load the catalog seed records.
    fn load_catalog(&self) -> impl Future<Output = Result<CatalogSeed, StoreError>> + Send;

    /// Load the saved player, or `None` when no save exists.
    fn load_player_state(
        &self,
    ) -> impl Future<Output = Result<Option<PlayerState>, StoreError>> + Send;

    /// Persist the player.
    fn save_player_state(
        &self,
        state: &PlayerState,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
