//! Market pricing and trading.
//!
//! # Price formula
//!
//! ```text
//! price = base_value x rarity_modifier x city_modifier x event_modifier x noise
//! ```
//!
//! clamped to `[base_value x min_price_multiplier, base_value x max_price_multiplier]`.
//!
//! - The city modifier is the product of the city's multiplier for every tag
//!   the ingredient carries (missing tags count as 1).
//! - The event modifier comes from [`crate::events::event_multiplier`].
//! - The noise factor is a pure function of `(day, ingredient id)` in
//!   `[0.9, 1.1]`, so prices and price histories are reproducible.
//!
//! Buying charges `ceil(price x qty)`; selling pays
//! `floor(price x sell_ratio x qty)`.

use std::cmp::Reverse;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use alchemist_types::{
    ActiveEvent, City, DreamSaleReceipt, Ingredient, IngredientId, MarketPrice, MarketTrend,
    PricePoint, PurchaseReceipt, Rarity, SaleReceipt, TrendDirection,
};

use crate::catalog::Catalog;
use crate::config::{EconomyConfig, GameConfig};
use crate::error::GameError;
use crate::events;
use crate::inventory;
use crate::player::{FIRST_DAY, PlayerState};
use crate::reputation::{self, ReputationDelta};

// ---------------------------------------------------------------------------
// Deterministic noise
// ---------------------------------------------------------------------------

/// Mixing constant combining the day with the ingredient hash.
const NOISE_MIX: u64 = 0x517c_c1b7_2722_0a95;

/// Replacement state when mixing lands on zero.
const NOISE_FALLBACK_STATE: u64 = 0xdead_beef_cafe_babe;

/// Number of distinct noise steps in `[0.9000, 1.1000]`.
const NOISE_STEPS: u64 = 2_001;

/// Lowest noise factor, in ten-thousandths.
const NOISE_FLOOR: u32 = 9_000;

/// FNV-1a over the id bytes. Stable across runs and platforms.
fn stable_hash(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Deterministic price noise for an ingredient on a given day.
///
/// Returns a factor in `[0.9, 1.1]` with four decimal places. The same
/// inputs always produce the same output.
pub fn daily_noise(day: u32, ingredient_id: &str) -> Decimal {
    let mut state = stable_hash(ingredient_id).wrapping_add(u64::from(day).wrapping_mul(NOISE_MIX));
    if state == 0 {
        state = NOISE_FALLBACK_STATE;
    }

    // xorshift64
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;

    let step = u32::try_from(state % NOISE_STEPS).unwrap_or(0);
    Decimal::new(i64::from(NOISE_FLOOR.saturating_add(step)), 4)
}

// ---------------------------------------------------------------------------
// PricingEngine
// ---------------------------------------------------------------------------

/// Read-only price computation over a catalog.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine<'a> {
    catalog: &'a Catalog,
    config: &'a EconomyConfig,
}

impl<'a> PricingEngine<'a> {
    /// Create a pricing engine.
    pub const fn new(catalog: &'a Catalog, config: &'a EconomyConfig) -> Self {
        Self { catalog, config }
    }

    /// Price multiplier for a rarity.
    pub const fn rarity_modifier(&self, rarity: Rarity) -> Decimal {
        self.config.rarity_modifiers.get(rarity)
    }

    /// Units a market offers for a rarity.
    pub const fn available_quantity(&self, rarity: Rarity) -> u32 {
        self.config.available_quantities.get(rarity)
    }

    /// Product of the city's multipliers over the ingredient's tags.
    pub fn city_modifier(ingredient: &Ingredient, city: &City) -> Result<Decimal, GameError> {
        let mut modifier = Decimal::ONE;
        for tag in &ingredient.tags {
            if let Some(factor) = city.tag_modifiers.get(tag) {
                modifier = modifier
                    .checked_mul(*factor)
                    .ok_or_else(|| GameError::overflow("city modifier"))?;
            }
        }
        Ok(modifier)
    }

    /// Price of an ingredient in a city on a day.
    ///
    /// Pure: identical inputs always yield the identical price.
    pub fn current_price(
        &self,
        ingredient_id: &str,
        city_id: &str,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<Decimal, GameError> {
        let ingredient = self.ingredient(ingredient_id)?;
        let city = self.city(city_id)?;
        self.price_of(ingredient, city, day, active_events)
    }

    /// Sell price: the current price scaled by the sell ratio.
    pub fn sell_price(
        &self,
        ingredient_id: &str,
        city_id: &str,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<Decimal, GameError> {
        self.current_price(ingredient_id, city_id, day, active_events)?
            .checked_mul(self.config.sell_ratio)
            .ok_or_else(|| GameError::overflow("sell price"))
    }

    /// The market board of a city, ordered by rarity then name.
    pub fn market_prices(
        &self,
        city_id: &str,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<Vec<MarketPrice>, GameError> {
        let city = self.city(city_id)?;
        let mut prices = self
            .catalog
            .ingredients()
            .map(|ingredient| self.market_row(ingredient, city, day, active_events))
            .collect::<Result<Vec<_>, _>>()?;
        prices.sort_by(|a, b| a.rarity.cmp(&b.rarity).then_with(|| a.name.cmp(&b.name)));
        Ok(prices)
    }

    /// A single market row.
    pub fn ingredient_price(
        &self,
        city_id: &str,
        ingredient_id: &str,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<MarketPrice, GameError> {
        let ingredient = self.ingredient(ingredient_id)?;
        let city = self.city(city_id)?;
        self.market_row(ingredient, city, day, active_events)
    }

    /// Prices for the last `days` days ending on `today`, oldest first.
    ///
    /// Days before the first game day are skipped.
    pub fn price_history(
        &self,
        ingredient_id: &str,
        city_id: &str,
        today: u32,
        days: u32,
        active_events: &[ActiveEvent],
    ) -> Result<Vec<PricePoint>, GameError> {
        let ingredient = self.ingredient(ingredient_id)?;
        let city = self.city(city_id)?;
        let first = today.saturating_sub(days.saturating_sub(1)).max(FIRST_DAY);
        if days == 0 || today < FIRST_DAY {
            return Ok(Vec::new());
        }

        (first..=today)
            .map(|day| {
                Ok(PricePoint {
                    day,
                    price: self.price_of(ingredient, city, day, active_events)?,
                })
            })
            .collect()
    }

    /// Ingredients trending in a city, strongest change first.
    pub fn trends(
        &self,
        city_id: &str,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<Vec<MarketTrend>, GameError> {
        let mut trending: Vec<MarketTrend> = self
            .market_prices(city_id, day, active_events)?
            .into_iter()
            .filter(|p| p.is_trending)
            .map(|p| MarketTrend {
                direction: if p.change_percent > Decimal::ZERO {
                    TrendDirection::Rising
                } else {
                    TrendDirection::Falling
                },
                ingredient_id: p.ingredient_id,
                name: p.name,
                change_percent: p.change_percent,
            })
            .collect();
        trending.sort_by_key(|t| Reverse(t.change_percent.abs()));
        trending.truncate(self.config.max_trends);
        Ok(trending)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ingredient(&self, ingredient_id: &str) -> Result<&'a Ingredient, GameError> {
        self.catalog
            .ingredient(ingredient_id)
            .ok_or_else(|| GameError::UnknownIngredient(IngredientId::from(ingredient_id)))
    }

    fn city(&self, city_id: &str) -> Result<&'a City, GameError> {
        self.catalog
            .city(city_id)
            .ok_or_else(|| GameError::UnknownCity(city_id.into()))
    }

    fn price_of(
        &self,
        ingredient: &Ingredient,
        city: &City,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<Decimal, GameError> {
        let base = ingredient.base_value;
        let event_modifier = events::event_multiplier(
            self.catalog,
            active_events,
            ingredient.id.as_str(),
            city.id.as_str(),
        )?;
        let raw = [
            self.rarity_modifier(ingredient.rarity),
            Self::city_modifier(ingredient, city)?,
            event_modifier,
            daily_noise(day, ingredient.id.as_str()),
        ]
        .into_iter()
        .try_fold(base, Decimal::checked_mul)
        .ok_or_else(|| GameError::overflow("ingredient price"))?;

        let floor = base
            .checked_mul(self.config.min_price_multiplier)
            .ok_or_else(|| GameError::overflow("price floor"))?;
        let ceiling = base
            .checked_mul(self.config.max_price_multiplier)
            .ok_or_else(|| GameError::overflow("price ceiling"))?;
        Ok(raw.max(floor).min(ceiling))
    }

    fn market_row(
        &self,
        ingredient: &Ingredient,
        city: &City,
        day: u32,
        active_events: &[ActiveEvent],
    ) -> Result<MarketPrice, GameError> {
        let current = self.price_of(ingredient, city, day, active_events)?;
        let change_percent = change_percent(current, ingredient.base_value)?;
        Ok(MarketPrice {
            ingredient_id: ingredient.id.clone(),
            name: ingredient.name.clone(),
            rarity: ingredient.rarity,
            current_price: current,
            base_price: ingredient.base_value,
            change_percent,
            is_trending: change_percent.abs() > self.config.trend_threshold_percent,
            available_quantity: self.available_quantity(ingredient.rarity),
            tags: ingredient.tags.iter().copied().collect(),
            color: ingredient.color.clone(),
            icon_id: ingredient.icon_id.clone(),
        })
    }
}

/// `(current - base) / base x 100`, rounded to two places.
fn change_percent(current: Decimal, base: Decimal) -> Result<Decimal, GameError> {
    current
        .checked_sub(base)
        .and_then(|diff| diff.checked_div(base))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(2))
        .ok_or_else(|| GameError::overflow("price change percent"))
}

/// Convert a non-negative whole decimal into coins.
fn to_coins(amount: Decimal, context: &str) -> Result<u64, GameError> {
    amount.to_u64().ok_or_else(|| GameError::overflow(context))
}

// ---------------------------------------------------------------------------
// Trading
// ---------------------------------------------------------------------------

/// Buy `quantity` units of an ingredient in the player's current city.
pub fn buy(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    ingredient_id: &str,
    quantity: u32,
) -> Result<PurchaseReceipt, GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity);
    }
    let pricing = PricingEngine::new(catalog, &config.economy);
    let unit_price = pricing.current_price(
        ingredient_id,
        state.current_city.as_str(),
        state.current_day,
        &state.active_events,
    )?;
    let total = unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| GameError::overflow("purchase total"))?
        .ceil();
    let total_cost = to_coins(total, "purchase total")?;

    if state.coins < total_cost {
        return Err(GameError::InsufficientCoins {
            required: total_cost,
            available: state.coins,
        });
    }
    inventory::add_items(state, catalog, ingredient_id, quantity)?;
    state.debit(total_cost)?;

    info!(
        ingredient_id,
        quantity,
        unit_price = %unit_price,
        total_cost,
        coins = state.coins,
        "purchase"
    );

    Ok(PurchaseReceipt {
        ingredient_id: IngredientId::from(ingredient_id),
        quantity,
        unit_price,
        total_cost,
        coins_remaining: state.coins,
    })
}

/// Sell `quantity` held units of an ingredient in the player's current city.
pub fn sell(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    ingredient_id: &str,
    quantity: u32,
) -> Result<SaleReceipt, GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity);
    }
    let held = state.quantity_of(ingredient_id);
    if held < quantity {
        return Err(GameError::InsufficientQuantity {
            ingredient_id: IngredientId::from(ingredient_id),
            requested: quantity,
            available: held,
        });
    }

    let pricing = PricingEngine::new(catalog, &config.economy);
    let unit_price = pricing.sell_price(
        ingredient_id,
        state.current_city.as_str(),
        state.current_day,
        &state.active_events,
    )?;
    let revenue = unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| GameError::overflow("sale revenue"))?
        .floor();
    let total_revenue = to_coins(revenue, "sale revenue")?;

    inventory::remove_items(state, catalog, ingredient_id, quantity)?;
    state.credit(total_revenue)?;

    info!(
        ingredient_id,
        quantity,
        unit_price = %unit_price,
        total_revenue,
        coins = state.coins,
        "sale"
    );

    Ok(SaleReceipt {
        ingredient_id: IngredientId::from(ingredient_id),
        quantity,
        unit_price,
        total_revenue,
        coins_remaining: state.coins,
    })
}

/// Reputation gained on each of trust and lucidity for selling a dream.
pub const fn dream_sale_reputation(rarity: Rarity) -> i32 {
    match rarity {
        Rarity::Common | Rarity::Uncommon => 1,
        Rarity::Rare => 2,
        Rarity::Epic => 5,
        Rarity::Legendary => 10,
    }
}

/// Sell a crafted dream from the player's stash.
pub fn sell_crafted_dream(
    state: &mut PlayerState,
    config: &GameConfig,
    dream_id: &alchemist_types::DreamId,
) -> Result<DreamSaleReceipt, GameError> {
    let index = state
        .crafted_dreams
        .iter()
        .position(|d| d.id == *dream_id)
        .ok_or(GameError::UnknownDream(*dream_id))?;
    let dream = state.crafted_dreams.remove(index);

    let revenue = to_coins(dream.value.floor(), "dream value")?;
    state.credit(revenue)?;

    let gain = dream_sale_reputation(dream.rarity);
    reputation::update_reputation(
        state,
        ReputationDelta::new(gain, 0, gain),
        &config.progression,
    );

    info!(
        dream_id = %dream.id,
        name = %dream.name,
        revenue,
        reputation_gain = gain,
        "crafted dream sold"
    );

    Ok(DreamSaleReceipt {
        dream_id: dream.id,
        name: dream.name,
        revenue,
        reputation_gain: gain,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use alchemist_types::{CityId, DreamTag};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::catalog::CatalogSeed;

    fn ingredient(id: &str, rarity: Rarity, base: Decimal, tags: &[DreamTag]) -> Ingredient {
        Ingredient {
            id: IngredientId::from(id),
            name: format!("{id} essence"),
            description: String::new(),
            rarity,
            base_value: base,
            weight: 1,
            volatile: false,
            tags: tags.iter().copied().collect::<BTreeSet<_>>(),
            color: String::new(),
            icon_id: String::new(),
        }
    }

    fn city(id: &str, modifiers: &[(DreamTag, Decimal)]) -> City {
        City {
            id: CityId::from(id),
            name: id.to_owned(),
            description: String::new(),
            tag_modifiers: modifiers.iter().copied().collect::<BTreeMap<_, _>>(),
            event_pool: Vec::new(),
            travel_cost: 0,
            travel_days: 0,
            required_reputation: 0,
            theme_color: String::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_seed(CatalogSeed {
            ingredients: vec![
                ingredient("starlight", Rarity::Common, dec!(10), &[DreamTag::Joyful]),
                ingredient("void", Rarity::Legendary, dec!(500), &[DreamTag::Dark]),
                ingredient(
                    "echo",
                    Rarity::Rare,
                    dec!(40),
                    &[DreamTag::Nostalgic, DreamTag::Melancholic],
                ),
            ],
            cities: vec![
                city("somnia_terminal", &[]),
                city(
                    "velvet_bazaar",
                    &[
                        (DreamTag::Nostalgic, dec!(1.5)),
                        (DreamTag::Melancholic, dec!(2)),
                    ],
                ),
                city("gloom", &[(DreamTag::Joyful, dec!(0.1))]),
            ],
            ..CatalogSeed::default()
        })
    }

    #[test]
    fn noise_is_deterministic_and_bounded() {
        for day in 1..200 {
            for id in ["starlight", "void", "echo", ""] {
                let a = daily_noise(day, id);
                assert_eq!(a, daily_noise(day, id));
                assert!(a >= dec!(0.9) && a <= dec!(1.1));
            }
        }
    }

    #[test]
    fn noise_varies_across_days() {
        let distinct: BTreeSet<Decimal> = (1..50).map(|d| daily_noise(d, "starlight")).collect();
        assert!(distinct.len() > 10);
    }

    #[test]
    fn prices_stay_within_clamp() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        for day in 1..100 {
            for city in ["somnia_terminal", "velvet_bazaar", "gloom"] {
                for ingredient in catalog.ingredients() {
                    let price = pricing
                        .current_price(ingredient.id.as_str(), city, day, &[])
                        .unwrap();
                    assert!(price >= ingredient.base_value * dec!(0.5));
                    assert!(price <= ingredient.base_value * dec!(3.0));
                }
            }
        }
    }

    #[test]
    fn price_composes_modifiers() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        // echo: 40 x 2.5 (rare) x 1.5 x 2 = 300 before noise, clamped to 120.
        let price = pricing.current_price("echo", "velvet_bazaar", 3, &[]).unwrap();
        assert_eq!(price, dec!(120));
        // starlight at home: 10 x 1.0 x noise.
        let home = pricing.current_price("starlight", "somnia_terminal", 3, &[]).unwrap();
        assert_eq!(home, dec!(10) * daily_noise(3, "starlight"));
        // starlight in gloom: 10 x 0.1 x noise, clamped up to 5.
        let gloom = pricing.current_price("starlight", "gloom", 3, &[]).unwrap();
        assert_eq!(gloom, dec!(5));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        assert!(matches!(
            pricing.current_price("ghost", "somnia_terminal", 1, &[]),
            Err(GameError::UnknownIngredient(_))
        ));
        assert!(matches!(
            pricing.market_prices("atlantis", 1, &[]),
            Err(GameError::UnknownCity(_))
        ));
    }

    #[test]
    fn market_board_is_ordered_by_rarity_then_name() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        let board = pricing.market_prices("somnia_terminal", 1, &[]).unwrap();
        let ids: Vec<&str> = board.iter().map(|p| p.ingredient_id.as_str()).collect();
        assert_eq!(ids, vec!["starlight", "echo", "void"]);
        assert_eq!(board.first().map(|p| p.available_quantity), Some(50));
        assert_eq!(board.last().map(|p| p.available_quantity), Some(3));
    }

    #[test]
    fn history_skips_days_before_start() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        let history = pricing
            .price_history("starlight", "somnia_terminal", 3, 7, &[])
            .unwrap();
        let days: Vec<u32> = history.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![1, 2, 3]);

        let later = pricing
            .price_history("starlight", "somnia_terminal", 20, 5, &[])
            .unwrap();
        let days: Vec<u32> = later.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![16, 17, 18, 19, 20]);
        assert_eq!(
            later.last().map(|p| p.price),
            pricing
                .current_price("starlight", "somnia_terminal", 20, &[])
                .ok()
        );
    }

    #[test]
    fn history_covers_the_full_window() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        let history = pricing
            .price_history("starlight", "somnia_terminal", 100, 60, &[])
            .unwrap();
        assert_eq!(history.len(), 60);
        assert_eq!(history.first().map(|p| p.day), Some(41));
        assert_eq!(history.last().map(|p| p.day), Some(100));

        let everything = pricing
            .price_history("starlight", "somnia_terminal", 100, 365, &[])
            .unwrap();
        assert_eq!(everything.len(), 100);
        assert_eq!(everything.first().map(|p| p.day), Some(1));
        assert!(pricing
            .price_history("starlight", "somnia_terminal", 100, 0, &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn trends_report_large_moves() {
        let catalog = catalog();
        let config = EconomyConfig::default();
        let pricing = PricingEngine::new(&catalog, &config);
        let trends = pricing.trends("velvet_bazaar", 4, &[]).unwrap();
        // echo is pinned at the 3x ceiling (+200%); void sits at legendary
        // 7x, also clamped to +200%.
        assert!(trends.iter().all(|t| t.change_percent.abs() > dec!(20)));
        assert!(trends.iter().any(|t| t.ingredient_id.as_str() == "echo"
            && t.direction == TrendDirection::Rising));
        let gloom = pricing.trends("gloom", 4, &[]).unwrap();
        assert!(gloom.iter().any(|t| t.ingredient_id.as_str() == "starlight"
            && t.direction == TrendDirection::Falling));
    }

    #[test]
    fn dream_sale_reputation_by_rarity() {
        assert_eq!(dream_sale_reputation(Rarity::Common), 1);
        assert_eq!(dream_sale_reputation(Rarity::Uncommon), 1);
        assert_eq!(dream_sale_reputation(Rarity::Rare), 2);
        assert_eq!(dream_sale_reputation(Rarity::Epic), 5);
        assert_eq!(dream_sale_reputation(Rarity::Legendary), 10);
    }
}
