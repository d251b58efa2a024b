//! Timed events: rolling, activation, expiry, and choice resolution.
//!
//! Each event instance moves through **Inactive -> Active -> Expired**. On
//! every day advance:
//!
//! 1. every active instance loses one day;
//! 2. instances with no days left are removed;
//! 3. with `base_event_probability`, one roll is made against the current
//!    city's event pool. Candidates already active are skipped; the first
//!    candidate whose own probability check passes triggers and the roll
//!    stops there.
//!
//! Triggering applies the event's reputation effect to trust once and
//! inserts an [`ActiveEvent`]. Active events feed price multipliers into
//! the pricing engine for the city they are scoped to.

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use alchemist_types::{
    ActiveEvent, ActiveEventView, ChoiceId, ChoiceReport, DayReport, DreamTag, EventId, GameEvent,
};

use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::inventory;
use crate::player::PlayerState;
use crate::reputation::{self, ReputationDelta};

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// Events from the catalog that are running in the given city.
fn running_in<'a>(
    catalog: &'a Catalog,
    active_events: &'a [ActiveEvent],
    city_id: &'a str,
) -> impl Iterator<Item = &'a GameEvent> {
    active_events
        .iter()
        .filter(move |a| a.city_id.as_str() == city_id && !a.is_expired())
        .filter_map(|a| catalog.event(a.event_id.as_str()))
}

/// Product of the tag multipliers of every event running in the city.
pub fn tag_multiplier(
    catalog: &Catalog,
    active_events: &[ActiveEvent],
    city_id: &str,
    tag: DreamTag,
) -> Result<Decimal, GameError> {
    running_in(catalog, active_events, city_id)
        .filter_map(|event| event.tag_modifiers.get(&tag).copied())
        .try_fold(Decimal::ONE, Decimal::checked_mul)
        .ok_or_else(|| GameError::overflow("event tag multiplier"))
}

/// Product of every ingredient-specific and tag-specific multiplier that
/// running events in the city apply to the ingredient.
///
/// Ingredients unknown to the catalog only receive ingredient-specific
/// multipliers.
pub fn event_multiplier(
    catalog: &Catalog,
    active_events: &[ActiveEvent],
    ingredient_id: &str,
    city_id: &str,
) -> Result<Decimal, GameError> {
    let mut multiplier = running_in(catalog, active_events, city_id)
        .filter_map(|event| event.price_modifiers.get(ingredient_id).copied())
        .try_fold(Decimal::ONE, Decimal::checked_mul)
        .ok_or_else(|| GameError::overflow("event ingredient multiplier"))?;

    if let Some(ingredient) = catalog.ingredient(ingredient_id) {
        for tag in &ingredient.tags {
            multiplier = multiplier
                .checked_mul(tag_multiplier(catalog, active_events, city_id, *tag)?)
                .ok_or_else(|| GameError::overflow("event multiplier"))?;
        }
    }
    Ok(multiplier)
}

// ---------------------------------------------------------------------------
// Day advance
// ---------------------------------------------------------------------------

/// Advance the calendar by `days`, running expiry and one event roll per day.
pub fn advance_days(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
    days: u32,
) -> Result<DayReport, GameError> {
    let mut report = DayReport {
        day: state.current_day,
        ..DayReport::default()
    };
    for _ in 0..days {
        state.advance_calendar(1)?;
        report.expired_events.extend(expire_events(state));

        let roll: f64 = rng.random();
        if roll < config.events.base_event_probability {
            if let Some(event_id) = roll_random_event(state, catalog, config, rng)? {
                report.triggered_events.push(event_id);
            }
        }
        report.days_advanced = report.days_advanced.saturating_add(1);
    }
    report.day = state.current_day;
    debug!(
        day = report.day,
        expired = report.expired_events.len(),
        triggered = report.triggered_events.len(),
        "days advanced"
    );
    Ok(report)
}

/// Decrement every active event by one day and remove the expired ones.
fn expire_events(state: &mut PlayerState) -> Vec<EventId> {
    for active in &mut state.active_events {
        active.days_remaining = active.days_remaining.saturating_sub(1);
    }
    let expired: Vec<EventId> = state
        .active_events
        .iter()
        .filter(|a| a.is_expired())
        .map(|a| a.event_id.clone())
        .collect();
    state.active_events.retain(|a| !a.is_expired());
    for event_id in &expired {
        info!(event_id = %event_id, day = state.current_day, "event expired");
    }
    expired
}

// ---------------------------------------------------------------------------
// Triggering
// ---------------------------------------------------------------------------

/// Roll the current city's event pool once.
///
/// Returns the triggered event id, or `None` if the cap is reached, the
/// pool has no eligible events, or no probability check passed.
pub fn roll_random_event(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<Option<EventId>, GameError> {
    if state.active_events.len() >= config.events.max_simultaneous_events {
        return Ok(None);
    }
    let Some(city) = catalog.city(state.current_city.as_str()) else {
        return Ok(None);
    };

    let candidates: Vec<&GameEvent> = city
        .event_pool
        .iter()
        .filter(|id| !is_active(state, id.as_str()))
        .filter_map(|id| catalog.event(id.as_str()))
        .collect();

    for event in candidates {
        let roll: f64 = rng.random();
        if roll < event.probability {
            trigger_event(state, catalog, config, event.id.as_str())?;
            return Ok(Some(event.id.clone()));
        }
    }
    Ok(None)
}

/// Activate a specific event in the player's current city.
pub fn trigger_event(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    event_id: &str,
) -> Result<ActiveEvent, GameError> {
    let event = catalog
        .event(event_id)
        .ok_or_else(|| GameError::UnknownEvent(EventId::from(event_id)))?;
    if is_active(state, event_id) {
        return Err(GameError::EventAlreadyActive(event.id.clone()));
    }
    let cap = config.events.max_simultaneous_events;
    if state.active_events.len() >= cap {
        return Err(GameError::EventCapReached { cap });
    }

    let active = ActiveEvent {
        event_id: event.id.clone(),
        city_id: state.current_city.clone(),
        days_remaining: event.duration,
        started_on_day: state.current_day,
    };
    state.active_events.push(active.clone());

    if event.reputation_effect != 0 {
        reputation::update_reputation(
            state,
            ReputationDelta::trust(event.reputation_effect),
            &config.progression,
        );
    }

    info!(
        event_id = %event.id,
        name = %event.name,
        city_id = %active.city_id,
        duration = event.duration,
        "event triggered"
    );
    Ok(active)
}

/// Resolve a player choice on an active event.
///
/// Charges the choice's cost, applies its trust delta, grants its item
/// rewards, and ends the event. Rewards must fit in the remaining capacity;
/// reward ids missing from the catalog are skipped.
pub fn resolve_choice(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    event_id: &str,
    choice_id: &str,
) -> Result<ChoiceReport, GameError> {
    let index = state
        .active_events
        .iter()
        .position(|a| a.event_id.as_str() == event_id)
        .ok_or_else(|| GameError::UnknownEvent(EventId::from(event_id)))?;
    let event = catalog
        .event(event_id)
        .ok_or_else(|| GameError::UnknownEvent(EventId::from(event_id)))?;
    let choice = event.choice(choice_id).ok_or_else(|| GameError::UnknownChoice {
        event_id: event.id.clone(),
        choice_id: ChoiceId::from(choice_id),
    })?;

    if choice.coins_cost > 0 {
        state.debit(choice.coins_cost)?;
    }
    if choice.reputation_effect != 0 {
        reputation::update_reputation(
            state,
            ReputationDelta::trust(choice.reputation_effect),
            &config.progression,
        );
    }

    let mut granted = std::collections::BTreeMap::new();
    for (ingredient_id, quantity) in &choice.item_rewards {
        if *quantity == 0 {
            continue;
        }
        if catalog.ingredient(ingredient_id.as_str()).is_none() {
            warn!(
                event_id,
                ingredient_id = %ingredient_id,
                "skipping reward for unknown ingredient"
            );
            continue;
        }
        inventory::add_items(state, catalog, ingredient_id.as_str(), *quantity)?;
        granted.insert(ingredient_id.clone(), *quantity);
    }

    state.active_events.remove(index);

    info!(
        event_id,
        choice_id,
        coins_paid = choice.coins_cost,
        reputation_change = choice.reputation_effect,
        "event choice resolved"
    );

    Ok(ChoiceReport {
        event_id: event.id.clone(),
        choice_id: choice.id.clone(),
        coins_paid: choice.coins_cost,
        reputation_change: choice.reputation_effect,
        items_granted: granted,
        result_text: choice.result_text.clone(),
    })
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Whether an event is running in any city.
pub fn is_active(state: &PlayerState, event_id: &str) -> bool {
    state
        .active_events
        .iter()
        .any(|a| a.event_id.as_str() == event_id)
}

/// An active instance joined with its catalog definition.
pub fn view(catalog: &Catalog, active: &ActiveEvent) -> Option<ActiveEventView> {
    let event = catalog.event(active.event_id.as_str())?;
    Some(ActiveEventView {
        event: event.clone(),
        city_id: active.city_id.clone(),
        days_remaining: active.days_remaining,
        started_on_day: active.started_on_day,
    })
}

/// Running events joined with their catalog definitions.
///
/// Instances whose event is no longer in the catalog are skipped.
pub fn active_event_views(state: &PlayerState, catalog: &Catalog) -> Vec<ActiveEventView> {
    state
        .active_events
        .iter()
        .filter_map(|active| view(catalog, active))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_support::{ScriptedRng, fixture_catalog, fixture_config};

    fn fresh(config: &GameConfig) -> PlayerState {
        PlayerState::new(&config.economy)
    }

    #[test]
    fn one_day_event_expires_after_one_advance() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        let mut short = trigger_event(&mut state, &catalog, &config, "dream_fog").unwrap();
        state.active_events.clear();
        short.days_remaining = 1;
        state.active_events.push(short);

        // First roll 0.99 skips the daily event roll.
        let mut rng = ScriptedRng::new(&[0.99]);
        let report = advance_days(&mut state, &catalog, &config, &mut rng, 1).unwrap();
        assert!(state.active_events().is_empty());
        assert_eq!(report.expired_events, vec![EventId::from("dream_fog")]);
        assert_eq!(state.current_day(), 2);
    }

    #[test]
    fn longer_events_count_down() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "dream_fog").unwrap();
        let mut rng = ScriptedRng::new(&[0.99, 0.99]);
        advance_days(&mut state, &catalog, &config, &mut rng, 2).unwrap();
        assert_eq!(state.active_events().first().map(|a| a.days_remaining), Some(1));
    }

    #[test]
    fn first_passing_candidate_wins() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        // Pool order: dream_fog (p=0.5), nightmare_raid (p=0.3), lucid_fair (p=0.9).
        // 0.6 fails fog, 0.1 passes raid; lucid_fair is never rolled.
        let mut rng = ScriptedRng::new(&[0.6, 0.1, 0.0]);
        let triggered = roll_random_event(&mut state, &catalog, &config, &mut rng).unwrap();
        assert_eq!(triggered, Some(EventId::from("nightmare_raid")));
        assert_eq!(state.active_events().len(), 1);
    }

    #[test]
    fn no_candidate_passing_triggers_nothing() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        let mut rng = ScriptedRng::new(&[0.99, 0.99, 0.99]);
        let triggered = roll_random_event(&mut state, &catalog, &config, &mut rng).unwrap();
        assert_eq!(triggered, None);
        assert!(state.active_events().is_empty());
    }

    #[test]
    fn daily_roll_gates_the_pool() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        // 0.05 passes the 0.15 daily gate, 0.0 passes dream_fog.
        let mut rng = ScriptedRng::new(&[0.05, 0.0]);
        let report = advance_days(&mut state, &catalog, &config, &mut rng, 1).unwrap();
        assert_eq!(report.triggered_events, vec![EventId::from("dream_fog")]);
        assert_eq!(
            state.active_events().first().map(|a| a.started_on_day),
            Some(2)
        );
    }

    #[test]
    fn trigger_applies_trust_once() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "nightmare_raid").unwrap();
        assert_eq!(state.reputation().trust(), -5);
    }

    #[test]
    fn trigger_refuses_duplicates_and_cap() {
        let catalog = fixture_catalog();
        let mut config = fixture_config();
        config.events.max_simultaneous_events = 2;
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "dream_fog").unwrap();
        assert!(matches!(
            trigger_event(&mut state, &catalog, &config, "dream_fog"),
            Err(GameError::EventAlreadyActive(_))
        ));
        trigger_event(&mut state, &catalog, &config, "lucid_fair").unwrap();
        assert!(matches!(
            trigger_event(&mut state, &catalog, &config, "nightmare_raid"),
            Err(GameError::EventCapReached { cap: 2 })
        ));
        assert!(matches!(
            trigger_event(&mut state, &catalog, &config, "meteor"),
            Err(GameError::UnknownEvent(_))
        ));
    }

    #[test]
    fn cap_blocks_random_rolls() {
        let catalog = fixture_catalog();
        let mut config = fixture_config();
        config.events.max_simultaneous_events = 1;
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "dream_fog").unwrap();
        let mut rng = ScriptedRng::new(&[0.0, 0.0, 0.0]);
        assert_eq!(
            roll_random_event(&mut state, &catalog, &config, &mut rng).unwrap(),
            None
        );
    }

    #[test]
    fn multipliers_apply_only_in_scoped_city() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "dream_fog").unwrap();
        let active = state.active_events().to_vec();

        // dream_fog: starlight x1.5, Mystical tag x2.
        assert_eq!(
            event_multiplier(&catalog, &active, "starlight", "somnia_terminal").unwrap(),
            dec!(1.5)
        );
        assert_eq!(
            event_multiplier(&catalog, &active, "moonstone", "somnia_terminal").unwrap(),
            dec!(2)
        );
        assert_eq!(
            tag_multiplier(&catalog, &active, "somnia_terminal", DreamTag::Mystical).unwrap(),
            dec!(2)
        );
        assert_eq!(
            event_multiplier(&catalog, &active, "starlight", "velvet_bazaar").unwrap(),
            Decimal::ONE
        );
    }

    #[test]
    fn resolve_choice_pays_and_rewards() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "nightmare_raid").unwrap();
        let report =
            resolve_choice(&mut state, &catalog, &config, "nightmare_raid", "bribe").unwrap();
        assert_eq!(report.coins_paid, 200);
        assert_eq!(state.coins(), 4_800);
        // -5 on trigger, +3 from the choice.
        assert_eq!(state.reputation().trust(), -2);
        assert_eq!(state.quantity_of("starlight"), 2);
        assert!(!is_active(&state, "nightmare_raid"));
    }

    #[test]
    fn resolve_choice_refuses_when_broke() {
        let catalog = fixture_catalog();
        let mut config = fixture_config();
        config.economy.starting_coins = 50;
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "nightmare_raid").unwrap();
        let result = resolve_choice(&mut state, &catalog, &config, "nightmare_raid", "bribe");
        assert!(matches!(result, Err(GameError::InsufficientCoins { .. })));
    }

    #[test]
    fn resolve_choice_refuses_rewards_that_do_not_fit() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        // Ten void pearls fill the 100-weight pack.
        inventory::add_items(&mut state, &catalog, "void", 10).unwrap();
        trigger_event(&mut state, &catalog, &config, "nightmare_raid").unwrap();
        let result = resolve_choice(&mut state, &catalog, &config, "nightmare_raid", "bribe");
        assert!(matches!(result, Err(GameError::CapacityExceeded { .. })));
    }

    #[test]
    fn resolve_choice_needs_known_ids() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        assert!(matches!(
            resolve_choice(&mut state, &catalog, &config, "nightmare_raid", "bribe"),
            Err(GameError::UnknownEvent(_))
        ));
        trigger_event(&mut state, &catalog, &config, "nightmare_raid").unwrap();
        assert!(matches!(
            resolve_choice(&mut state, &catalog, &config, "nightmare_raid", "pray"),
            Err(GameError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let run = |seed| {
            let mut state = fresh(&config);
            let mut rng = SmallRng::seed_from_u64(seed);
            advance_days(&mut state, &catalog, &config, &mut rng, 60).unwrap();
            state.active_events().to_vec()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn views_join_catalog_definitions() {
        let catalog = fixture_catalog();
        let config = fixture_config();
        let mut state = fresh(&config);
        trigger_event(&mut state, &catalog, &config, "lucid_fair").unwrap();
        let views = active_event_views(&state, &catalog);
        assert_eq!(views.len(), 1);
        assert_eq!(views.first().map(|v| v.event.name.as_str()), Some("Lucid Fair"));
        assert_eq!(views.first().map(|v| v.days_remaining), Some(4));
    }
}
