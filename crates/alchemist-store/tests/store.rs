//! Integration tests for the `alchemist-store` persistence layer.
//!
//! File-backed tests run in a unique directory under the system temp dir
//! and clean up after themselves.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects
)]

use std::path::PathBuf;

use alchemist_engine::config::EconomyConfig;
use alchemist_engine::{GameConfig, PlayerState};
use alchemist_store::{
    GameStore, JsonFileStore, MemoryStore, SaveOrigin, StoreError, bootstrap, bundled_seed,
    save_if_dirty,
};

/// A fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("alchemist-store-{name}-{}", uuid::Uuid::now_v7()))
}

async fn cleanup(dir: &PathBuf) {
    let _ = tokio::fs::remove_dir_all(dir).await;
}

// =============================================================================
// JsonFileStore
// =============================================================================

#[tokio::test]
async fn save_round_trips_through_disk() {
    let dir = scratch_dir("round-trip");
    let store = JsonFileStore::new(dir.join("saves"), dir.join("catalog"));

    assert!(store.load_player_state().await.unwrap().is_none());

    let state = PlayerState::new(&EconomyConfig::default());
    store.save_player_state(&state).await.unwrap();

    let loaded = store.load_player_state().await.unwrap().expect("save exists");
    assert_eq!(loaded, state);
    assert!(
        !dir.join("saves").join("player.json.tmp").exists(),
        "temp file must be renamed away"
    );

    cleanup(&dir).await;
}

#[tokio::test]
async fn corrupt_save_is_an_error() {
    let dir = scratch_dir("corrupt");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("player.json"), "{ not json").await.unwrap();
    let store = JsonFileStore::new(&dir, dir.join("catalog"));

    let result = store.load_player_state().await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));

    cleanup(&dir).await;
}

#[tokio::test]
async fn missing_catalog_dir_uses_bundled_seed() {
    let dir = scratch_dir("bundled");
    let store = JsonFileStore::new(dir.join("saves"), dir.join("nowhere"));

    let seed = store.load_catalog().await.unwrap();
    assert_eq!(seed, bundled_seed());
    assert_eq!(seed.ingredients.len(), 15);
}

#[tokio::test]
async fn broken_catalog_files_degrade_to_empty_sections() {
    let dir = scratch_dir("partial");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(
        dir.join("ingredients.yaml"),
        "- id: dew\n  name: Morning Dew\n  rarity: Common\n  base_value: \"8\"\n  weight: 1\n",
    )
    .await
    .unwrap();
    tokio::fs::write(dir.join("recipes.yaml"), "- id: [broken")
        .await
        .unwrap();
    let store = JsonFileStore::new(dir.join("saves"), &dir);

    let seed = store.load_catalog().await.unwrap();
    assert_eq!(seed.ingredients.len(), 1);
    assert!(seed.recipes.is_empty());
    assert!(seed.cities.is_empty());
    assert!(seed.events.is_empty());

    cleanup(&dir).await;
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn first_run_starts_and_saves_a_new_game() {
    let store = MemoryStore::new(bundled_seed());
    let ready = bootstrap(&store, GameConfig::default()).await;

    assert_eq!(ready.origin, SaveOrigin::Fresh);
    assert!(!ready.session.is_dirty());
    assert_eq!(store.save_count().await, 1);
    assert_eq!(ready.session.state().coins(), 5_000);
    assert_eq!(ready.session.state().current_city().as_str(), "somnia_terminal");
}

#[tokio::test]
async fn clean_save_is_loaded_without_rewriting() {
    let state = PlayerState::new(&EconomyConfig::default());
    let store = MemoryStore::with_player(bundled_seed(), state.clone());
    let ready = bootstrap(&store, GameConfig::default()).await;

    assert_eq!(ready.origin, SaveOrigin::Loaded);
    assert_eq!(ready.session.state(), &state);
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn save_in_a_vanished_city_is_repaired() {
    let economy = EconomyConfig {
        starting_city: String::from("drowned_library"),
        ..EconomyConfig::default()
    };
    let state = PlayerState::new(&economy);
    let store = MemoryStore::with_player(bundled_seed(), state);
    let ready = bootstrap(&store, GameConfig::default()).await;

    assert_eq!(ready.origin, SaveOrigin::Repaired);
    assert_eq!(ready.session.state().current_city().as_str(), "somnia_terminal");
    assert!(!ready.session.state().unlocked_cities().contains("drowned_library"));
    let saved = store.saved().await.expect("repair is saved");
    assert_eq!(saved.current_city().as_str(), "somnia_terminal");
}

#[tokio::test]
async fn unreadable_save_starts_over() {
    let dir = scratch_dir("recover");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("player.json"), "[]").await.unwrap();
    let store = JsonFileStore::new(&dir, dir.join("nowhere"));

    let ready = bootstrap(&store, GameConfig::default()).await;
    assert_eq!(ready.origin, SaveOrigin::Recovered);
    assert!(store.load_player_state().await.unwrap().is_some());

    cleanup(&dir).await;
}

#[tokio::test]
async fn empty_catalog_still_yields_a_session() {
    let store = MemoryStore::default();
    let ready = bootstrap(&store, GameConfig::default()).await;

    assert!(ready.session.catalog().is_empty());
    let prices = ready.session.current_prices("somnia_terminal");
    assert!(!prices.success);
    assert!(ready.session.all_cities().is_empty());
}

#[tokio::test]
async fn dirty_sessions_are_saved_once() {
    let store = MemoryStore::new(bundled_seed());
    let mut session = bootstrap(&store, GameConfig::default()).await.session;
    let saves_before = store.save_count().await;

    assert!(!save_if_dirty(&store, &mut session).await.unwrap());
    assert!(session.buy("starlight_essence", 3).success);
    assert!(save_if_dirty(&store, &mut session).await.unwrap());
    assert!(!save_if_dirty(&store, &mut session).await.unwrap());

    assert_eq!(store.save_count().await, saves_before + 1);
    let saved = store.saved().await.unwrap();
    assert_eq!(saved.quantity_of("starlight_essence"), 3);
}
