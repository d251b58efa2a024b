//! Travel between cities.
//!
//! A trip is gated on the destination's reputation requirement (compared
//! with the player's total reputation) and its coin cost. Eligibility is
//! checked in a fixed order: unknown city, already there, reputation,
//! coins. On departure the cost is paid, the player moves, the destination
//! is unlocked, and the calendar advances by the trip length so that events
//! rolled on the road are scoped to the destination.

use rand::Rng;
use tracing::info;

use alchemist_types::{City, CityId, TravelCost, TravelReport};

use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::events;
use crate::player::PlayerState;

/// Check whether the player can travel to a city.
///
/// Returns the destination on success.
pub fn check_travel<'a>(
    state: &PlayerState,
    catalog: &'a Catalog,
    city_id: &str,
) -> Result<&'a City, GameError> {
    let city = catalog
        .city(city_id)
        .ok_or_else(|| GameError::UnknownCity(CityId::from(city_id)))?;
    if state.current_city.as_str() == city_id {
        return Err(GameError::AlreadyInCity(city.id.clone()));
    }
    let current = state.reputation.total();
    if current < city.required_reputation {
        return Err(GameError::ReputationTooLow {
            city_id: city.id.clone(),
            required: city.required_reputation,
            current,
        });
    }
    if state.coins < city.travel_cost {
        return Err(GameError::InsufficientCoins {
            required: city.travel_cost,
            available: state.coins,
        });
    }
    Ok(city)
}

/// Whether a trip to the city would be accepted right now.
pub fn can_travel_to(state: &PlayerState, catalog: &Catalog, city_id: &str) -> bool {
    check_travel(state, catalog, city_id).is_ok()
}

/// Coin cost and duration of a trip to the city.
pub fn travel_cost(catalog: &Catalog, city_id: &str) -> Result<TravelCost, GameError> {
    let city = catalog
        .city(city_id)
        .ok_or_else(|| GameError::UnknownCity(CityId::from(city_id)))?;
    Ok(TravelCost {
        city_id: city.id.clone(),
        coins: city.travel_cost,
        days: city.travel_days,
    })
}

/// Travel to a city.
pub fn travel_to(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
    city_id: &str,
) -> Result<TravelReport, GameError> {
    let city = check_travel(state, catalog, city_id)?;

    state.debit(city.travel_cost)?;
    state.current_city = city.id.clone();
    let newly_unlocked = state.unlocked_cities.insert(city.id.clone());

    let days = events::advance_days(state, catalog, config, rng, city.travel_days)?;
    let events_triggered = days
        .triggered_events
        .iter()
        .filter_map(|id| catalog.event(id.as_str()))
        .map(|event| event.name.clone())
        .collect();

    info!(
        city_id = %city.id,
        cost = city.travel_cost,
        days = city.travel_days,
        newly_unlocked,
        day = state.current_day,
        "traveled"
    );

    Ok(TravelReport {
        destination_id: city.id.clone(),
        destination_name: city.name.clone(),
        days_passed: days.days_advanced,
        cost_paid: city.travel_cost,
        events_triggered,
        newly_unlocked,
    })
}

/// Human-readable summary of a trip.
pub fn outcome_message(report: &TravelReport) -> String {
    if report.newly_unlocked {
        format!("Discovered and traveled to {}!", report.destination_name)
    } else {
        format!("Traveled to {}", report.destination_name)
    }
}

/// Every city in the catalog.
pub fn all_cities(catalog: &Catalog) -> Vec<City> {
    catalog.cities().cloned().collect()
}

/// Cities the player has unlocked, in id order.
pub fn unlocked_cities(state: &PlayerState, catalog: &Catalog) -> Vec<City> {
    catalog
        .cities()
        .filter(|c| state.unlocked_cities.contains(&c.id))
        .cloned()
        .collect()
}

/// Whether the player has unlocked the city.
pub fn is_city_unlocked(state: &PlayerState, city_id: &str) -> bool {
    state.unlocked_cities.contains(city_id)
}
