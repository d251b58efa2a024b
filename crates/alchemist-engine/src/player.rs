//! The player aggregate.
//!
//! [`PlayerState`] is the single mutable root of a save slot. Its fields are
//! crate-private: callers read through accessors, and every mutation is
//! funneled through the engine modules (inventory, pricing, crafting,
//! events, travel, reputation) so that each invariant is enforced in one
//! place.
//!
//! # Invariants
//!
//! - `current_day >= 1`
//! - `current_weight <= max_weight` after any addition
//! - inventory holds no zero-quantity entries
//! - `unlocked_cities` always contains the starting city

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use alchemist_types::{ActiveEvent, CityId, CraftedDream, IngredientId, RecipeId};

use crate::catalog::Catalog;
use crate::config::{EconomyConfig, GameConfig};
use crate::error::GameError;
use crate::reputation::{self, MAX_TIER, MIN_TIER, Reputation, ReputationDelta};

/// First day of a new game.
pub const FIRST_DAY: u32 = 1;

/// Durable state of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub(crate) coins: u64,
    pub(crate) current_day: u32,
    pub(crate) current_city: CityId,
    pub(crate) tier: u8,
    pub(crate) title: String,
    pub(crate) player_name: String,
    pub(crate) reputation: Reputation,
    pub(crate) current_weight: u32,
    pub(crate) max_weight: u32,
    #[serde(default)]
    pub(crate) inventory: BTreeMap<IngredientId, u32>,
    #[serde(default)]
    pub(crate) crafted_dreams: Vec<CraftedDream>,
    #[serde(default)]
    pub(crate) discovered_recipes: BTreeSet<RecipeId>,
    #[serde(default)]
    pub(crate) unlocked_cities: BTreeSet<CityId>,
    #[serde(default)]
    pub(crate) active_events: Vec<ActiveEvent>,
    pub(crate) created_at: DateTime<Utc>,
}

impl PlayerState {
    /// Create a fresh player with the configured starting values.
    pub fn new(config: &EconomyConfig) -> Self {
        let starting_city = CityId::new(config.starting_city.clone());
        let title = reputation::tier_title(MIN_TIER).to_owned();
        Self {
            coins: config.starting_coins,
            current_day: FIRST_DAY,
            current_city: starting_city.clone(),
            tier: MIN_TIER,
            player_name: title.clone(),
            title,
            reputation: Reputation::default(),
            current_weight: 0,
            max_weight: config.starting_capacity,
            inventory: BTreeMap::new(),
            crafted_dreams: Vec::new(),
            discovered_recipes: BTreeSet::new(),
            unlocked_cities: BTreeSet::from([starting_city]),
            active_events: Vec::new(),
            created_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Coins held.
    pub const fn coins(&self) -> u64 {
        self.coins
    }

    /// Current game day (starts at 1).
    pub const fn current_day(&self) -> u32 {
        self.current_day
    }

    /// City the player is in.
    pub const fn current_city(&self) -> &CityId {
        &self.current_city
    }

    /// Progression tier (1 to 5).
    pub const fn tier(&self) -> u8 {
        self.tier
    }

    /// Title of the current tier.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display name; follows the title.
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// The reputation axes.
    pub const fn reputation(&self) -> Reputation {
        self.reputation
    }

    /// Weight currently carried.
    pub const fn current_weight(&self) -> u32 {
        self.current_weight
    }

    /// Maximum carrying weight.
    pub const fn max_weight(&self) -> u32 {
        self.max_weight
    }

    /// Held ingredients.
    pub const fn inventory(&self) -> &BTreeMap<IngredientId, u32> {
        &self.inventory
    }

    /// Crafted dreams awaiting sale.
    pub fn crafted_dreams(&self) -> &[CraftedDream] {
        &self.crafted_dreams
    }

    /// Recipes discovered in play.
    pub const fn discovered_recipes(&self) -> &BTreeSet<RecipeId> {
        &self.discovered_recipes
    }

    /// Cities the player has unlocked.
    pub const fn unlocked_cities(&self) -> &BTreeSet<CityId> {
        &self.unlocked_cities
    }

    /// Running events.
    pub fn active_events(&self) -> &[ActiveEvent] {
        &self.active_events
    }

    /// When the save was created.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Units of an ingredient held.
    pub fn quantity_of(&self, ingredient_id: &str) -> u32 {
        self.inventory.get(ingredient_id).copied().unwrap_or(0)
    }

    /// Whether the player holds at least one unit of the ingredient.
    pub fn holds(&self, ingredient_id: &str) -> bool {
        self.quantity_of(ingredient_id) > 0
    }

    /// Whether the recipe has been discovered, either in play or in the
    /// catalog seed.
    pub fn knows_recipe(&self, catalog: &Catalog, recipe_id: &str) -> bool {
        self.discovered_recipes.contains(recipe_id)
            || catalog.recipe(recipe_id).is_some_and(|r| r.discovered)
    }

    // -----------------------------------------------------------------------
    // Coins
    // -----------------------------------------------------------------------

    /// Add coins.
    pub fn credit(&mut self, amount: u64) -> Result<(), GameError> {
        self.coins = self
            .coins
            .checked_add(amount)
            .ok_or_else(|| GameError::overflow("coin balance"))?;
        Ok(())
    }

    /// Remove coins, refusing if the balance is short.
    pub fn debit(&mut self, amount: u64) -> Result<(), GameError> {
        self.coins = self
            .coins
            .checked_sub(amount)
            .ok_or(GameError::InsufficientCoins {
                required: amount,
                available: self.coins,
            })?;
        Ok(())
    }

    /// Advance the calendar without running any day-change logic.
    pub(crate) fn advance_calendar(&mut self, days: u32) -> Result<(), GameError> {
        self.current_day = self
            .current_day
            .checked_add(days)
            .ok_or_else(|| GameError::overflow("day counter"))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Repair
    // -----------------------------------------------------------------------

    /// Bring a loaded state back in line with the catalog and invariants.
    ///
    /// Unknown cities are replaced by the starting city, active events
    /// whose event or city left the catalog are dropped, weight is
    /// recomputed from the inventory, zero stacks are dropped, reputation is
    /// re-clamped, and the tier is bounded. Returns `true` if anything was
    /// changed.
    pub fn repair(&mut self, catalog: &Catalog, config: &GameConfig) -> bool {
        let before = self.clone();
        let starting_city = CityId::new(config.economy.starting_city.clone());

        if self.current_day < FIRST_DAY {
            self.current_day = FIRST_DAY;
        }

        if catalog.city(self.current_city.as_str()).is_none() {
            warn!(
                city_id = %self.current_city,
                fallback = %starting_city,
                "saved city no longer exists, moving player to the starting city"
            );
            self.current_city = starting_city.clone();
        }
        self.unlocked_cities
            .retain(|id| catalog.city(id.as_str()).is_some() || *id == starting_city);
        self.unlocked_cities.insert(starting_city);
        self.unlocked_cities.insert(self.current_city.clone());

        self.active_events.retain(|active| {
            let known = catalog.event(active.event_id.as_str()).is_some()
                && catalog.city(active.city_id.as_str()).is_some();
            if !known {
                warn!(
                    event_id = %active.event_id,
                    city_id = %active.city_id,
                    "dropping active event missing from the catalog"
                );
            }
            known
        });

        self.inventory.retain(|_, qty| *qty > 0);
        self.current_weight = self.inventory.iter().fold(0_u32, |total, (id, qty)| {
            let unit = catalog.ingredient(id.as_str()).map_or(0, |i| i.weight);
            total.saturating_add(unit.saturating_mul(*qty))
        });

        self.tier = self.tier.clamp(MIN_TIER, MAX_TIER);
        self.reputation = self.reputation.apply(
            ReputationDelta::default(),
            config.progression.reputation_min,
            config.progression.reputation_max,
        );
        if self.title.is_empty() {
            reputation::tier_title(self.tier).clone_into(&mut self.title);
        }
        if self.player_name.is_empty() {
            self.player_name.clone_from(&self.title);
        }

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use alchemist_types::{City, EventId};

    use super::*;
    use crate::catalog::CatalogSeed;

    fn city(id: &str) -> City {
        City {
            id: CityId::from(id),
            name: id.to_owned(),
            description: String::new(),
            tag_modifiers: BTreeMap::new(),
            event_pool: Vec::new(),
            travel_cost: 0,
            travel_days: 0,
            required_reputation: 0,
            theme_color: String::new(),
        }
    }

    #[test]
    fn new_player_has_starting_values() {
        let state = PlayerState::new(&EconomyConfig::default());
        assert_eq!(state.coins(), 5_000);
        assert_eq!(state.current_day(), 1);
        assert_eq!(state.current_city().as_str(), "somnia_terminal");
        assert_eq!(state.tier(), 1);
        assert_eq!(state.title(), "Novice Peddler");
        assert_eq!(state.max_weight(), 100);
        assert!(state.unlocked_cities().contains("somnia_terminal"));
    }

    #[test]
    fn debit_refuses_overdraft() {
        let mut state = PlayerState::new(&EconomyConfig::default());
        let result = state.debit(5_001);
        assert!(matches!(
            result,
            Err(GameError::InsufficientCoins {
                required: 5_001,
                available: 5_000
            })
        ));
        assert_eq!(state.coins(), 5_000);
        assert!(state.debit(5_000).is_ok());
        assert_eq!(state.coins(), 0);
    }

    #[test]
    fn repair_moves_player_out_of_removed_city() {
        let config = GameConfig::default();
        let catalog = Catalog::from_seed(CatalogSeed {
            cities: vec![city("somnia_terminal")],
            ..CatalogSeed::default()
        });
        let mut state = PlayerState::new(&config.economy);
        state.current_city = CityId::from("atlantis");
        state.unlocked_cities.insert(CityId::from("atlantis"));
        state.current_day = 0;

        assert!(state.repair(&catalog, &config));
        assert_eq!(state.current_city().as_str(), "somnia_terminal");
        assert!(!state.unlocked_cities().contains("atlantis"));
        assert_eq!(state.current_day(), 1);
        assert!(!state.repair(&catalog, &config));
    }

    #[test]
    fn repair_drops_orphaned_active_events() {
        let config = GameConfig::default();
        let catalog = crate::test_support::fixture_catalog();
        let mut state = PlayerState::new(&config.economy);
        let instance = |event: &str, city: &str| ActiveEvent {
            event_id: EventId::from(event),
            city_id: CityId::from(city),
            days_remaining: 2,
            started_on_day: 1,
        };
        state.active_events = vec![
            instance("dream_fog", "somnia_terminal"),
            instance("meteor_shower", "somnia_terminal"),
            instance("lucid_fair", "atlantis"),
        ];

        assert!(state.repair(&catalog, &config));
        let kept: Vec<&str> = state
            .active_events()
            .iter()
            .map(|a| a.event_id.as_str())
            .collect();
        assert_eq!(kept, vec!["dream_fog"]);
        assert!(!state.repair(&catalog, &config));
    }

    #[test]
    fn state_survives_json() {
        let state = PlayerState::new(&EconomyConfig::default());
        let json = serde_json::to_string(&state).unwrap_or_default();
        let back: Option<PlayerState> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(state));
    }
}
