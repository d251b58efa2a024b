//! In-memory store for tests and embedding.

use tokio::sync::Mutex;

use alchemist_engine::{CatalogSeed, PlayerState};

use crate::error::StoreError;
use crate::store::GameStore;

/// Store that keeps the catalog and the save in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: CatalogSeed,
    player: Mutex<Option<PlayerState>>,
    saves: Mutex<u64>,
}

impl MemoryStore {
    /// Create a store serving the given catalog and no save.
    pub fn new(catalog: CatalogSeed) -> Self {
        Self {
            catalog,
            player: Mutex::new(None),
            saves: Mutex::new(0),
        }
    }

    /// Create a store serving the given catalog and an existing save.
    pub fn with_player(catalog: CatalogSeed, state: PlayerState) -> Self {
        Self {
            catalog,
            player: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    /// The saved player, if any.
    pub async fn saved(&self) -> Option<PlayerState> {
        self.player.lock().await.clone()
    }

    /// Number of saves performed.
    pub async fn save_count(&self) -> u64 {
        *self.saves.lock().await
    }
}

impl GameStore for MemoryStore {
    async fn load_catalog(&self) -> Result<CatalogSeed, StoreError> {
        Ok(self.catalog.clone())
    }

    async fn load_player_state(&self) -> Result<Option<PlayerState>, StoreError> {
        Ok(self.player.lock().await.clone())
    }

    async fn save_player_state(&self, state: &PlayerState) -> Result<(), StoreError> {
        *self.player.lock().await = Some(state.clone());
        let mut saves = self.saves.lock().await;
        *saves = saves.saturating_add(1);
        Ok(())
    }
}
