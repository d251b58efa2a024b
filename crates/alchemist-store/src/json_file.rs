//! File-backed store: YAML catalog seed and a JSON player save.
//!
//! # Layout
//!
//! ```text
//! <catalog_dir>/ingredients.yaml
//! <catalog_dir>/recipes.yaml
//! <catalog_dir>/cities.yaml
//! <catalog_dir>/events.yaml
//! <save_dir>/player.json
//! ```
//!
//! When the catalog directory does not exist the bundled seed is used.
//! A missing or corrupt section file degrades to an empty list. The save is
//! written to a temporary file and renamed over `player.json`, so a crash
//! mid-write never leaves a truncated save behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use alchemist_engine::config::StorageConfig;
use alchemist_engine::{CatalogSeed, PlayerState};

use crate::error::StoreError;
use crate::seed::{self, CITIES_FILE, EVENTS_FILE, INGREDIENTS_FILE, RECIPES_FILE};
use crate::store::GameStore;

/// Name of the player save file.
pub const SAVE_FILE: &str = "player.json";

/// Store backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    save_dir: PathBuf,
    catalog_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store over the given directories.
    pub fn new(save_dir: impl Into<PathBuf>, catalog_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            catalog_dir: catalog_dir.into(),
        }
    }

    /// Create a store from the storage section of the configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.save_dir, &config.catalog_dir)
    }

    /// Path of the player save.
    pub fn save_path(&self) -> PathBuf {
        self.save_dir.join(SAVE_FILE)
    }

    /// Directory the catalog seed is read from.
    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    async fn read_section<T: DeserializeOwned>(&self, section: &str, file: &str) -> Vec<T> {
        let path = self.catalog_dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(yaml) => seed::parse_section_or_empty(section, &yaml),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "seed file unreadable, using an empty list");
                Vec::new()
            }
        }
    }
}

impl GameStore for JsonFileStore {
    async fn load_catalog(&self) -> Result<CatalogSeed, StoreError> {
        let is_dir = tokio::fs::metadata(&self.catalog_dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            info!(
                catalog_dir = %self.catalog_dir.display(),
                "catalog directory absent, using bundled seed"
            );
            return Ok(seed::bundled_seed());
        }

        let catalog = CatalogSeed {
            ingredients: self.read_section("ingredients", INGREDIENTS_FILE).await,
            recipes: self.read_section("recipes", RECIPES_FILE).await,
            cities: self.read_section("cities", CITIES_FILE).await,
            events: self.read_section("events", EVENTS_FILE).await,
        };
        debug!(
            catalog_dir = %self.catalog_dir.display(),
            ingredients = catalog.ingredients.len(),
            recipes = catalog.recipes.len(),
            cities = catalog.cities.len(),
            events = catalog.events.len(),
            "catalog seed read"
        );
        Ok(catalog)
    }

    async fn load_player_state(&self) -> Result<Option<PlayerState>, StoreError> {
        let path = self.save_path();
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let state: PlayerState = serde_json::from_str(&json)?;
        debug!(path = %path.display(), day = state.current_day(), "player save loaded");
        Ok(Some(state))
    }

    async fn save_player_state(&self, state: &PlayerState) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|e| StoreError::io(&self.save_dir, e))?;

        let json = serde_json::to_string_pretty(state)?;
        let path = self.save_path();
        let tmp = self.save_dir.join(format!("{SAVE_FILE}.tmp"));
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        debug!(
            path = %path.display(),
            day = state.current_day(),
            coins = state.coins(),
            "player saved"
        );
        Ok(())
    }
}
