//! Command-line driver for the Dream Alchemist economy.
//!
//! Loads configuration, restores (or starts) a save, and plays an automated
//! trading session, saving after every turn.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `alchemist-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Open the file store
//! 4. Restore the save, repairing or recovering it when needed
//! 5. Play the automated session
//! 6. Log the result

mod driver;
mod error;

use std::path::{Path, PathBuf};

use alchemist_engine::GameConfig;
use alchemist_store::{JsonFileStore, bootstrap};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "alchemist-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration file is unreadable or a save
/// cannot be written.
#[tokio::main]
async fn main() -> Result<(), CliError> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, found) = load_config(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("dream-alchemist starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Open the file store.
    let store = JsonFileStore::from_config(&config.storage);
    info!(
        save = %store.save_path().display(),
        catalog = %store.catalog_dir().display(),
        "Store opened"
    );

    // 4. Restore the save.
    let turns = config.session.autoplay_days;
    let ready = bootstrap(&store, config).await;
    let mut session = ready.session;
    info!(
        origin = %ready.origin,
        player = session.state().player_name(),
        day = session.state().current_day(),
        city = %session.state().current_city(),
        coins = session.state().coins(),
        "Session ready"
    );

    // 5. Play.
    let summary = driver::autoplay(&mut session, &store, turns).await?;

    // 6. Log the result.
    let reputation = session.reputation();
    info!(
        turns = summary.turns,
        coins_start = summary.coins_start,
        coins_end = summary.coins_end,
        purchases = summary.purchases,
        sales = summary.sales,
        dreams_crafted = summary.dreams_crafted,
        dreams_sold = summary.dreams_sold,
        trips = summary.trips,
        choices = summary.choices_resolved,
        saves = summary.saves,
        "Session finished"
    );
    info!(
        day = session.state().current_day(),
        city = %session.state().current_city(),
        tier = reputation.tier,
        title = %reputation.title,
        total_reputation = reputation.total,
        known_recipes = session.known_recipes().len(),
        "Final standing"
    );

    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(GameConfig, bool), CliError> {
    if path.exists() {
        Ok((GameConfig::from_file(path)?, true))
    } else {
        let mut config = GameConfig::default();
        config.storage.apply_env_overrides();
        Ok((config, false))
    }
}
