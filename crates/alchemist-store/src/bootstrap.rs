//! Session bootstrap with graceful degradation.
//!
//! Building a session never fails. An unreadable catalog degrades to an
//! empty one, a missing or unreadable save starts a fresh game, and a save
//! that references cities or ingredients no longer in the catalog is
//! repaired before play resumes. Fresh, recovered and repaired states are
//! written back immediately.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use alchemist_engine::{Catalog, CatalogSeed, GameConfig, GameSession};

use crate::error::StoreError;
use crate::store::GameStore;

/// Where the session's player state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    /// No save existed; a new game was started.
    Fresh,
    /// The save loaded cleanly.
    Loaded,
    /// The save loaded but needed repairs against the catalog.
    Repaired,
    /// The save was unreadable; a new game was started.
    Recovered,
}

impl fmt::Display for SaveOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fresh => "fresh",
            Self::Loaded => "loaded",
            Self::Repaired => "repaired",
            Self::Recovered => "recovered",
        };
        f.write_str(label)
    }
}

/// A ready-to-play session.
#[derive(Debug)]
pub struct Bootstrapped {
    /// The session.
    pub session: GameSession,
    /// Where the player state came from.
    pub origin: SaveOrigin,
}

/// Load the catalog and player from the store and build a session.
pub async fn bootstrap<S: GameStore>(store: &S, config: GameConfig) -> Bootstrapped {
    let seed = store.load_catalog().await.unwrap_or_else(|e| {
        warn!(error = %e, "catalog unavailable, continuing with an empty catalog");
        CatalogSeed::default()
    });
    let catalog = Arc::new(Catalog::from_seed(seed));
    if catalog.is_empty() {
        warn!("catalog is empty; markets, recipes and travel will report no data");
    }

    let (mut session, origin) = match store.load_player_state().await {
        Ok(Some(mut state)) => {
            let origin = if state.repair(&catalog, &config) {
                SaveOrigin::Repaired
            } else {
                SaveOrigin::Loaded
            };
            (GameSession::new(catalog, config, state), origin)
        }
        Ok(None) => (GameSession::new_game(catalog, config), SaveOrigin::Fresh),
        Err(e) => {
            warn!(error = %e, "player save unreadable, starting a new game");
            (GameSession::new_game(catalog, config), SaveOrigin::Recovered)
        }
    };

    if origin != SaveOrigin::Loaded {
        match store.save_player_state(session.state()).await {
            Ok(()) => session.mark_saved(),
            Err(e) => warn!(error = %e, %origin, "could not write the initial save"),
        }
    }

    info!(
        %origin,
        day = session.state().current_day(),
        city = %session.state().current_city(),
        coins = session.state().coins(),
        "session ready"
    );
    Bootstrapped { session, origin }
}

/// Persist the session if it has unsaved changes.
///
/// Returns whether a save was written.
pub async fn save_if_dirty<S: GameStore>(
    store: &S,
    session: &mut GameSession,
) -> Result<bool, StoreError> {
    if !session.is_dirty() {
        return Ok(false);
    }
    store.save_player_state(session.state()).await?;
    session.mark_saved();
    Ok(true)
}
