//! Automated trading session.
//!
//! The driver plays a greedy merchant for a fixed number of turns. Each
//! turn it:
//!
//! 1. resolves choices on events running in the current city,
//! 2. sells crafted dreams,
//! 3. crafts every known recipe it holds ingredients for,
//! 4. sells stock trading above base value,
//! 5. buys discounted stock and missing recipe ingredients with a quarter
//!    of its coins,
//! 6. travels every few turns, otherwise waits a day.
//!
//! The session is saved after every step that changed it.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};

use alchemist_engine::GameSession;
use alchemist_store::{GameStore, StoreError, save_if_dirty};
use alchemist_types::{IngredientId, InventorySort, MarketPrice};

/// Sell stock priced at least this far above base (percent).
const SELL_PREMIUM_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Buy stock priced at least this far below base (percent, negative).
const BUY_DISCOUNT_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, true, 0);

/// Share of coins spent on purchases per turn (`coins / divisor`).
const BUDGET_DIVISOR: u64 = 4;

/// Turns between trips.
const TRAVEL_INTERVAL: u32 = 5;

/// Upper bound on repeated crafts of one recipe per turn.
const MAX_CRAFTS_PER_RECIPE: u32 = 10;

/// Totals for an automated session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoplaySummary {
    /// Turns played.
    pub turns: u32,
    /// Coins when the session started.
    pub coins_start: u64,
    /// Coins when the session ended.
    pub coins_end: u64,
    /// Successful purchases.
    pub purchases: u32,
    /// Successful sales of ingredients.
    pub sales: u32,
    /// Dreams crafted, including successful experiments.
    pub dreams_crafted: u32,
    /// Dreams sold.
    pub dreams_sold: u32,
    /// Trips taken.
    pub trips: u32,
    /// Event choices resolved.
    pub choices_resolved: u32,
    /// Saves written.
    pub saves: u32,
}

fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

/// Play `turns` turns, saving through `store` after each step that
/// changed the session.
pub async fn autoplay<S: GameStore>(
    session: &mut GameSession,
    store: &S,
    turns: u32,
) -> Result<AutoplaySummary, StoreError> {
    let mut summary = AutoplaySummary {
        coins_start: session.state().coins(),
        ..AutoplaySummary::default()
    };

    for turn in 1..=turns {
        resolve_events(session, &mut summary);
        checkpoint(store, session, &mut summary).await?;
        sell_dreams(session, &mut summary);
        checkpoint(store, session, &mut summary).await?;
        craft_known(session, &mut summary);
        checkpoint(store, session, &mut summary).await?;
        sell_high(session, &mut summary);
        checkpoint(store, session, &mut summary).await?;
        buy_low(session, &mut summary);
        checkpoint(store, session, &mut summary).await?;

        let day_before = session.state().current_day();
        if turn.is_multiple_of(TRAVEL_INTERVAL) {
            travel(session, &mut summary);
            checkpoint(store, session, &mut summary).await?;
        }
        if session.state().current_day() == day_before {
            let day = session.advance_day();
            if let Some(report) = day.payload {
                debug!(
                    day = report.day,
                    expired = report.expired_events.len(),
                    triggered = report.triggered_events.len(),
                    "new day"
                );
            }
        }

        checkpoint(store, session, &mut summary).await?;
        bump(&mut summary.turns);
    }

    summary.coins_end = session.state().coins();
    Ok(summary)
}

/// Persist the session if the last step changed it.
async fn checkpoint<S: GameStore>(
    store: &S,
    session: &mut GameSession,
    summary: &mut AutoplaySummary,
) -> Result<(), StoreError> {
    if save_if_dirty(store, session).await? {
        bump(&mut summary.saves);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Turn steps
// ---------------------------------------------------------------------------

fn resolve_events(session: &mut GameSession, summary: &mut AutoplaySummary) {
    let city = session.state().current_city().clone();
    let coins = session.state().coins();
    let pending: Vec<(String, String)> = session
        .active_events()
        .into_iter()
        .filter(|view| view.city_id == city)
        .filter_map(|view| {
            let choice = view
                .event
                .choices
                .iter()
                .flatten()
                .filter(|c| c.coins_cost <= coins)
                .max_by_key(|c| c.reputation_effect)?;
            Some((view.event.id.to_string(), choice.id.to_string()))
        })
        .collect();

    for (event_id, choice_id) in pending {
        let result = session.resolve_choice(&event_id, &choice_id);
        if result.success {
            info!(
                event_id = %event_id,
                choice_id = %choice_id,
                outcome = %result.message,
                "event choice made"
            );
            bump(&mut summary.choices_resolved);
        }
    }
}

fn sell_dreams(session: &mut GameSession, summary: &mut AutoplaySummary) {
    let dreams: Vec<_> = session
        .state()
        .crafted_dreams()
        .iter()
        .map(|d| d.id)
        .collect();
    for dream_id in dreams {
        if session.sell_crafted_dream(&dream_id).success {
            bump(&mut summary.dreams_sold);
        }
    }
}

fn craft_known(session: &mut GameSession, summary: &mut AutoplaySummary) {
    for recipe in session.known_recipes() {
        for _ in 0..MAX_CRAFTS_PER_RECIPE {
            if !session.can_craft_recipe(recipe.id.as_str()) {
                break;
            }
            let result = session.craft_recipe(recipe.id.as_str());
            if !result.success {
                break;
            }
            bump(&mut summary.dreams_crafted);
        }
    }
}

/// Ingredients the known recipes call for.
fn wanted_ingredients(session: &GameSession) -> BTreeSet<IngredientId> {
    session
        .known_recipes()
        .into_iter()
        .flat_map(|r| r.required_ingredients)
        .collect()
}

fn market(session: &GameSession) -> Vec<MarketPrice> {
    let city = session.state().current_city().clone();
    session.current_prices(city.as_str()).payload.unwrap_or_default()
}

fn sell_high(session: &mut GameSession, summary: &mut AutoplaySummary) {
    let wanted = wanted_ingredients(session);
    let prices = market(session);
    for item in session.inventory_items(InventorySort::Name) {
        if wanted.contains(&item.ingredient_id) {
            continue;
        }
        let premium = prices
            .iter()
            .find(|p| p.ingredient_id == item.ingredient_id)
            .is_some_and(|p| p.change_percent >= SELL_PREMIUM_PERCENT);
        if premium && session.sell(item.ingredient_id.as_str(), item.quantity).success {
            bump(&mut summary.sales);
        }
    }
}

fn buy_low(session: &mut GameSession, summary: &mut AutoplaySummary) {
    let wanted = wanted_ingredients(session);
    let mut prices: Vec<MarketPrice> = market(session)
        .into_iter()
        .filter(|p| {
            p.change_percent <= BUY_DISCOUNT_PERCENT
                || (wanted.contains(&p.ingredient_id)
                    && !session.state().holds(p.ingredient_id.as_str()))
        })
        .collect();
    prices.sort_by_key(|p| p.change_percent);

    let mut budget = session.state().coins() / BUDGET_DIVISOR;
    for row in prices {
        let Some(unit_cost) = row.current_price.ceil().to_u64() else {
            continue;
        };
        let Some(weight) = session
            .catalog()
            .ingredient(row.ingredient_id.as_str())
            .map(|i| u64::from(i.weight))
        else {
            continue;
        };

        let affordable = budget.checked_div(unit_cost).unwrap_or(0);
        let fits = u64::from(session.available_space())
            .checked_div(weight)
            .unwrap_or(0);
        let quantity = affordable
            .min(fits)
            .min(u64::from(row.available_quantity));
        let Ok(quantity) = u32::try_from(quantity) else {
            continue;
        };
        if quantity == 0 {
            continue;
        }

        let result = session.buy(row.ingredient_id.as_str(), quantity);
        if let Some(receipt) = result.payload {
            budget = budget.saturating_sub(receipt.total_cost);
            bump(&mut summary.purchases);
        }
    }
}

fn travel(session: &mut GameSession, summary: &mut AutoplaySummary) {
    let destination = session
        .all_cities()
        .into_iter()
        .filter(|c| session.can_travel_to(c.id.as_str()).success)
        .max_by_key(|c| c.required_reputation);
    let Some(city) = destination else {
        return;
    };
    let result = session.travel_to(city.id.as_str());
    if let Some(report) = result.payload {
        info!(
            city = %report.destination_name,
            days = report.days_passed,
            cost = report.cost_paid,
            events = ?report.events_triggered,
            "{}",
            result.message
        );
        bump(&mut summary.trips);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use alchemist_engine::{Catalog, GameConfig};
    use alchemist_store::{MemoryStore, bundled_seed};

    use super::*;

    fn seeded_session(seed: u64) -> GameSession {
        let mut config = GameConfig::default();
        config.session.seed = Some(seed);
        GameSession::new_game(Arc::new(Catalog::from_seed(bundled_seed())), config)
    }

    #[tokio::test]
    async fn autoplay_advances_and_saves() {
        let store = MemoryStore::new(bundled_seed());
        let mut session = seeded_session(7);

        let summary = autoplay(&mut session, &store, 12).await.unwrap();

        assert_eq!(summary.turns, 12);
        assert!(session.state().current_day() >= 13);
        assert!(!session.is_dirty());
        assert!(summary.saves >= 1);
        assert_eq!(summary.coins_end, session.state().coins());
        assert!(summary.purchases >= 1);
        let saved = store.saved().await.unwrap();
        assert_eq!(&saved, session.state());
    }

    #[tokio::test]
    async fn autoplay_is_reproducible_with_a_seed() {
        let first_store = MemoryStore::new(bundled_seed());
        let second_store = MemoryStore::new(bundled_seed());
        let mut first = seeded_session(11);
        let mut second = seeded_session(11);

        let a = autoplay(&mut first, &first_store, 20).await.unwrap();
        let b = autoplay(&mut second, &second_store, 20).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(first.state().coins(), second.state().coins());
        assert_eq!(first.state().inventory(), second.state().inventory());
    }

    #[tokio::test]
    async fn each_changing_step_is_saved() {
        let store = MemoryStore::new(bundled_seed());
        let mut session = seeded_session(5);

        let summary = autoplay(&mut session, &store, 1).await.unwrap();

        // At least the purchases and the new day land in separate saves.
        assert!(summary.purchases >= 1);
        assert!(summary.saves >= 2);
        assert_eq!(store.save_count().await, u64::from(summary.saves));
        assert_eq!(&store.saved().await.unwrap(), session.state());
    }

    #[tokio::test]
    async fn zero_turns_changes_nothing() {
        let store = MemoryStore::new(bundled_seed());
        let mut session = seeded_session(3);
        let summary = autoplay(&mut session, &store, 0).await.unwrap();
        assert_eq!(summary.turns, 0);
        assert_eq!(summary.coins_start, summary.coins_end);
        assert_eq!(session.state().current_day(), 1);
    }
}
