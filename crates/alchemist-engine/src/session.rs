//! The game session facade.
//!
//! [`GameSession`] owns one player's state, a shared read-only catalog, the
//! configuration, and the session RNG used for event rolls and experimental
//! crafting. It is the public surface of the engine: every operation
//! returns a [`GameResult`] and never an `Err`.
//!
//! # Atomicity
//!
//! Mutating operations run against a staged clone of the player state. The
//! clone replaces the live state only when the operation succeeds, so a
//! refused operation leaves the state untouched. Committed operations mark
//! the session dirty until the caller persists and calls
//! [`GameSession::mark_saved`].
//!
//! # Randomness
//!
//! Price noise is a pure function of day and ingredient and never touches
//! the session RNG. The RNG is seeded from `session.seed` when configured
//! and from OS entropy otherwise.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::debug;

use alchemist_types::{
    ActiveEventView, ChoiceReport, City, CraftReport, DayReport, DreamId, DreamSaleReceipt,
    DreamTag, GameResult, IngredientId, InventoryItem, InventorySort, MarketPrice, MarketTrend,
    PricePoint, PurchaseReceipt, Recipe, ReputationSnapshot, SaleReceipt, TravelCost,
    TravelReport,
};

use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::crafting;
use crate::error::GameError;
use crate::events;
use crate::inventory;
use crate::player::PlayerState;
use crate::pricing::{self, PricingEngine};
use crate::reputation::{self, ReputationDelta};
use crate::travel;

/// One player's game, bound to a catalog and configuration.
#[derive(Debug)]
pub struct GameSession<R: Rng = SmallRng> {
    catalog: Arc<Catalog>,
    config: GameConfig,
    state: PlayerState,
    rng: R,
    dirty: bool,
}

impl GameSession<SmallRng> {
    /// Resume a session from an existing player state.
    pub fn new(catalog: Arc<Catalog>, config: GameConfig, state: PlayerState) -> Self {
        let rng = config
            .session
            .seed
            .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        Self::with_rng(catalog, config, state, rng)
    }

    /// Start a fresh game with the configured starting values.
    pub fn new_game(catalog: Arc<Catalog>, config: GameConfig) -> Self {
        let state = PlayerState::new(&config.economy);
        let mut session = Self::new(catalog, config, state);
        session.dirty = true;
        session
    }
}

impl<R: Rng> GameSession<R> {
    /// Build a session with an explicit RNG.
    pub const fn with_rng(
        catalog: Arc<Catalog>,
        config: GameConfig,
        state: PlayerState,
        rng: R,
    ) -> Self {
        Self {
            catalog,
            config,
            state,
            rng,
            dirty: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The live player state.
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The configuration.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Whether committed changes have not been saved yet.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the current state has been persisted.
    pub const fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Consume the session and return the player state.
    pub fn into_state(self) -> PlayerState {
        self.state
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Run `op` on a staged copy of the state and commit it on success.
    fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut PlayerState, &Catalog, &GameConfig, &mut R) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let mut staged = self.state.clone();
        let value = op(&mut staged, &self.catalog, &self.config, &mut self.rng)?;
        self.state = staged;
        self.dirty = true;
        Ok(value)
    }

    fn ingredient_name(&self, ingredient_id: &str) -> String {
        self.catalog
            .ingredient(ingredient_id)
            .map_or_else(|| ingredient_id.to_owned(), |i| i.name.clone())
    }

    fn pricing(&self) -> PricingEngine<'_> {
        PricingEngine::new(&self.catalog, &self.config.economy)
    }

    // -----------------------------------------------------------------------
    // Trading
    // -----------------------------------------------------------------------

    /// Buy ingredients in the current city.
    pub fn buy(&mut self, ingredient_id: &str, quantity: u32) -> GameResult<PurchaseReceipt> {
        let result = self.apply(|state, catalog, config, _| {
            pricing::buy(state, catalog, config, ingredient_id, quantity)
        });
        let name = self.ingredient_name(ingredient_id);
        respond("buy", result, |r| {
            format!("Purchased {} {name} for {} coins", r.quantity, r.total_cost)
        })
    }

    /// Sell ingredients in the current city.
    pub fn sell(&mut self, ingredient_id: &str, quantity: u32) -> GameResult<SaleReceipt> {
        let result = self.apply(|state, catalog, config, _| {
            pricing::sell(state, catalog, config, ingredient_id, quantity)
        });
        let name = self.ingredient_name(ingredient_id);
        respond("sell", result, |r| {
            format!("Sold {} {name} for {} coins", r.quantity, r.total_revenue)
        })
    }

    /// Sell a crafted dream.
    pub fn sell_crafted_dream(&mut self, dream_id: &DreamId) -> GameResult<DreamSaleReceipt> {
        let result = self.apply(|state, _, config, _| {
            pricing::sell_crafted_dream(state, config, dream_id)
        });
        respond("sell_crafted_dream", result, |r| {
            format!("Sold {} for {} coins", r.name, r.revenue)
        })
    }

    // -----------------------------------------------------------------------
    // Crafting
    // -----------------------------------------------------------------------

    /// Craft from two or three ingredient ids.
    ///
    /// A failed experiment is committed (the ingredients are gone) and
    /// reported with `success == false` and a payload.
    pub fn craft(&mut self, ingredient_ids: &[IngredientId]) -> GameResult<CraftReport> {
        let result = self.apply(|state, catalog, config, rng| {
            crafting::craft(state, catalog, config, rng, ingredient_ids)
        });
        craft_result(result)
    }

    /// Craft a recipe from its required ingredients.
    pub fn craft_recipe(&mut self, recipe_id: &str) -> GameResult<CraftReport> {
        let result = self.apply(|state, catalog, config, rng| {
            crafting::craft_recipe(state, catalog, config, rng, recipe_id)
        });
        craft_result(result)
    }

    /// Whether the player holds every ingredient the recipe needs.
    pub fn can_craft_recipe(&self, recipe_id: &str) -> bool {
        crafting::can_craft_recipe(&self.state, &self.catalog, recipe_id)
    }

    /// Known recipes with at least one required ingredient held.
    pub fn craftable_recipes(&self) -> Vec<Recipe> {
        crafting::craftable_recipes(&self.state, &self.catalog)
    }

    /// Recipes the player knows.
    pub fn known_recipes(&self) -> Vec<Recipe> {
        crafting::known_recipes(&self.state, &self.catalog)
    }

    /// Every recipe in the catalog.
    pub fn all_recipes(&self) -> Vec<Recipe> {
        self.catalog.recipes().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Travel
    // -----------------------------------------------------------------------

    /// Travel to a city.
    pub fn travel_to(&mut self, city_id: &str) -> GameResult<TravelReport> {
        let result = self.apply(|state, catalog, config, rng| {
            travel::travel_to(state, catalog, config, rng, city_id)
        });
        respond("travel_to", result, travel::outcome_message)
    }

    /// Whether a trip to the city would be accepted.
    ///
    /// The rejection names the first failed check.
    pub fn can_travel_to(&self, city_id: &str) -> GameResult<()> {
        let result = travel::check_travel(&self.state, &self.catalog, city_id).map(|_| ());
        respond("can_travel_to", result, |_| format!("You can travel to {city_id}"))
    }

    /// Coin cost and duration of a trip.
    pub fn travel_cost(&self, city_id: &str) -> GameResult<TravelCost> {
        let result = travel::travel_cost(&self.catalog, city_id);
        respond("travel_cost", result, |c| {
            format!("{} coins and {} days", c.coins, c.days)
        })
    }

    /// Every city in the catalog.
    pub fn all_cities(&self) -> Vec<City> {
        travel::all_cities(&self.catalog)
    }

    /// Cities the player has unlocked.
    pub fn unlocked_cities(&self) -> Vec<City> {
        travel::unlocked_cities(&self.state, &self.catalog)
    }

    /// Whether the player has unlocked the city.
    pub fn is_city_unlocked(&self, city_id: &str) -> bool {
        travel::is_city_unlocked(&self.state, city_id)
    }

    // -----------------------------------------------------------------------
    // Events and time
    // -----------------------------------------------------------------------

    /// Advance one day.
    pub fn advance_day(&mut self) -> GameResult<DayReport> {
        self.advance_days(1)
    }

    /// Advance several days, expiring and rolling events once per day.
    pub fn advance_days(&mut self, days: u32) -> GameResult<DayReport> {
        let result = self.apply(|state, catalog, config, rng| {
            events::advance_days(state, catalog, config, rng, days)
        });
        respond("advance_days", result, |r| format!("Day {}", r.day))
    }

    /// Roll the current city's event pool once, ignoring the daily base
    /// probability.
    pub fn trigger_random_event(&mut self) -> GameResult<ActiveEventView> {
        let result = self.apply(|state, catalog, config, rng| {
            events::roll_random_event(state, catalog, config, rng)
        });
        match result {
            Ok(Some(event_id)) => self.triggered_view(event_id.as_str()),
            Ok(None) => GameResult::empty("No new events occurred"),
            Err(err) => refuse("trigger_random_event", &err),
        }
    }

    /// Force a specific event in the current city.
    pub fn trigger_event(&mut self, event_id: &str) -> GameResult<ActiveEventView> {
        let result = self.apply(|state, catalog, config, _| {
            events::trigger_event(state, catalog, config, event_id)
        });
        match result {
            Ok(active) => self.triggered_view(active.event_id.as_str()),
            Err(err) => refuse("trigger_event", &err),
        }
    }

    fn triggered_view(&self, event_id: &str) -> GameResult<ActiveEventView> {
        self.state
            .active_events()
            .iter()
            .find(|a| a.event_id.as_str() == event_id)
            .and_then(|active| events::view(&self.catalog, active))
            .map_or_else(
                || GameResult::empty("No new events occurred"),
                |view| GameResult::ok(format!("Event: {}", view.event.name), view),
            )
    }

    /// Resolve a choice on an active event.
    pub fn resolve_choice(&mut self, event_id: &str, choice_id: &str) -> GameResult<ChoiceReport> {
        let result = self.apply(|state, catalog, config, _| {
            events::resolve_choice(state, catalog, config, event_id, choice_id)
        });
        respond("resolve_choice", result, |r| {
            r.result_text
                .clone()
                .unwrap_or_else(|| String::from("Choice resolved"))
        })
    }

    /// Running events with their definitions.
    pub fn active_events(&self) -> Vec<ActiveEventView> {
        events::active_event_views(&self.state, &self.catalog)
    }

    /// Event price multiplier for an ingredient in a city.
    pub fn event_multiplier(&self, ingredient_id: &str, city_id: &str) -> GameResult<Decimal> {
        let result = events::event_multiplier(
            &self.catalog,
            self.state.active_events(),
            ingredient_id,
            city_id,
        );
        respond("event_multiplier", result, |m| format!("x{m}"))
    }

    /// Event multiplier for a tag in a city.
    pub fn tag_multiplier(&self, city_id: &str, tag: DreamTag) -> GameResult<Decimal> {
        let result = events::tag_multiplier(&self.catalog, self.state.active_events(), city_id, tag);
        respond("tag_multiplier", result, |m| format!("x{m}"))
    }

    // -----------------------------------------------------------------------
    // Market
    // -----------------------------------------------------------------------

    /// Today's market board in a city.
    pub fn current_prices(&self, city_id: &str) -> GameResult<Vec<MarketPrice>> {
        let result = self.pricing().market_prices(
            city_id,
            self.state.current_day(),
            self.state.active_events(),
        );
        respond("current_prices", result, |p| {
            format!("{} ingredients on the market", p.len())
        })
    }

    /// Today's market row for one ingredient in a city.
    pub fn ingredient_price(&self, city_id: &str, ingredient_id: &str) -> GameResult<MarketPrice> {
        let result = self.pricing().ingredient_price(
            city_id,
            ingredient_id,
            self.state.current_day(),
            self.state.active_events(),
        );
        respond("ingredient_price", result, |p| {
            format!("{} trades at {}", p.name, p.current_price)
        })
    }

    /// Price history of an ingredient in the current city.
    pub fn price_history(&self, ingredient_id: &str, days: u32) -> GameResult<Vec<PricePoint>> {
        let result = self.pricing().price_history(
            ingredient_id,
            self.state.current_city().as_str(),
            self.state.current_day(),
            days,
            self.state.active_events(),
        );
        respond("price_history", result, |h| format!("{} days of history", h.len()))
    }

    /// Trending ingredients in a city.
    pub fn trends(&self, city_id: &str) -> GameResult<Vec<MarketTrend>> {
        let result = self.pricing().trends(
            city_id,
            self.state.current_day(),
            self.state.active_events(),
        );
        respond("trends", result, |t| format!("{} trending ingredients", t.len()))
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Held ingredients in the requested order.
    pub fn inventory_items(&self, sort: InventorySort) -> Vec<InventoryItem> {
        inventory::items(&self.state, &self.catalog, sort)
    }

    /// Free carrying capacity.
    pub const fn available_space(&self) -> u32 {
        inventory::available_space(&self.state)
    }

    /// Units held of an ingredient.
    pub fn item_quantity(&self, ingredient_id: &str) -> u32 {
        self.state.quantity_of(ingredient_id)
    }

    /// Whether `quantity` units fit. Unknown ingredients never fit.
    pub fn can_carry(&self, ingredient_id: &str, quantity: u32) -> bool {
        inventory::can_carry(&self.state, &self.catalog, ingredient_id, quantity).unwrap_or(false)
    }

    /// Raise the carrying capacity.
    pub fn upgrade_capacity(&mut self, amount: u32) -> GameResult<u32> {
        let result = self.apply(|state, _, _, _| inventory::upgrade_capacity(state, amount));
        respond("upgrade_capacity", result, |max| {
            format!("Carrying capacity is now {max}")
        })
    }

    // -----------------------------------------------------------------------
    // Reputation
    // -----------------------------------------------------------------------

    /// Apply a reputation change and re-evaluate the tier.
    pub fn update_reputation(&mut self, delta: ReputationDelta) -> GameResult<ReputationSnapshot> {
        let result = self.apply(|state, _, config, _| {
            let change = reputation::update_reputation(state, delta, &config.progression);
            Ok((change, reputation::snapshot(state)))
        });
        match result {
            Ok((change, snapshot)) => {
                let message = if change.tiered_up() {
                    format!("Promoted to {}!", snapshot.title)
                } else {
                    String::from("Reputation updated")
                };
                GameResult::ok(message, snapshot)
            }
            Err(err) => refuse("update_reputation", &err),
        }
    }

    /// The current reputation snapshot.
    pub fn reputation(&self) -> ReputationSnapshot {
        reputation::snapshot(&self.state)
    }
}

// ---------------------------------------------------------------------------
// Result mapping
// ---------------------------------------------------------------------------

fn refuse<T>(operation: &str, err: &GameError) -> GameResult<T> {
    let rejection = err.to_rejection();
    debug!(
        operation,
        reason = ?rejection.reason,
        category = ?rejection.category,
        message = %rejection.message,
        "operation refused"
    );
    GameResult::rejected(rejection)
}

fn respond<T>(
    operation: &str,
    result: Result<T, GameError>,
    message: impl FnOnce(&T) -> String,
) -> GameResult<T> {
    match result {
        Ok(payload) => GameResult::ok(message(&payload), payload),
        Err(err) => refuse(operation, &err),
    }
}

fn craft_result(result: Result<CraftReport, GameError>) -> GameResult<CraftReport> {
    match result {
        Ok(report) => {
            let message = crafting::outcome_message(&report);
            if report.dream.is_some() {
                GameResult::ok(message, report)
            } else {
                GameResult::failed(message, report)
            }
        }
        Err(err) => refuse("craft", &err),
    }
}
