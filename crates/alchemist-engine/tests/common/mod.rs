//! Shared fixtures for the engine integration tests.

#![allow(
    dead_code,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use alchemist_engine::{Catalog, CatalogSeed, GameConfig, GameSession, PlayerState};
use alchemist_types::{
    City, CityId, DreamTag, EventId, EventType, GameEvent, Ingredient, IngredientId, Rarity,
    Recipe, RecipeId,
};
use rand::RngCore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Replays fixed `f64` rolls, then rolls `0.0` forever.
pub struct ScriptedRng {
    rolls: Vec<f64>,
    next: usize,
}

impl ScriptedRng {
    pub fn new(rolls: &[f64]) -> Self {
        Self {
            rolls: rolls.to_vec(),
            next: 0,
        }
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let roll = self.rolls.get(self.next).copied().unwrap_or(0.0);
        self.next = self.next.saturating_add(1);
        let scaled = (roll.clamp(0.0, 1.0 - f64::EPSILON) * (1_u64 << 53) as f64) as u64;
        scaled << 11
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

fn ingredient(id: &str, name: &str, rarity: Rarity, base: Decimal, weight: u32, tags: &[DreamTag]) -> Ingredient {
    Ingredient {
        id: IngredientId::from(id),
        name: name.to_owned(),
        description: String::new(),
        rarity,
        base_value: base,
        weight,
        volatile: false,
        tags: tags.iter().copied().collect(),
        color: String::from("#8B5CF6"),
        icon_id: String::new(),
    }
}

/// Three ingredients, one undiscovered recipe over `ing1` + `ing2`, two
/// cities, and a one-day event.
pub fn catalog() -> Catalog {
    let mut harbor_mods = BTreeMap::new();
    harbor_mods.insert(DreamTag::Joyful, dec!(2.5));
    harbor_mods.insert(DreamTag::Dark, dec!(0.2));

    let mut surge = GameEvent {
        id: EventId::from("surge"),
        name: String::from("Surge"),
        description: String::new(),
        event_type: EventType::Market,
        probability: 1.0,
        duration: 1,
        price_modifiers: BTreeMap::new(),
        tag_modifiers: BTreeMap::new(),
        reputation_effect: 0,
        narrative_text: String::new(),
        choices: None,
    };
    surge.price_modifiers.insert(IngredientId::from("ing1"), dec!(4));
    surge.tag_modifiers.insert(DreamTag::Joyful, dec!(3));

    Catalog::from_seed(CatalogSeed {
        ingredients: vec![
            ingredient("ing1", "Dawn Petal", Rarity::Common, dec!(12), 2, &[DreamTag::Joyful]),
            ingredient("ing2", "Dusk Ember", Rarity::Rare, dec!(45), 3, &[DreamTag::Dark]),
            ingredient("ing3", "Tide Glass", Rarity::Legendary, dec!(300), 7, &[DreamTag::Joyful, DreamTag::Dark]),
        ],
        recipes: vec![Recipe {
            id: RecipeId::from("recipe1"),
            name: String::from("Twilight Bloom"),
            description: String::new(),
            rarity: Rarity::Rare,
            required_ingredients: [IngredientId::from("ing1"), IngredientId::from("ing2")]
                .into_iter()
                .collect(),
            alignment: String::from("balanced"),
            value_multiplier: dec!(1.8),
            discovered: false,
            tags: vec![DreamTag::Joyful],
            effect_id: None,
            narrative_text: None,
        }],
        cities: vec![
            City {
                id: CityId::from("somnia_terminal"),
                name: String::from("Somnia Terminal"),
                description: String::new(),
                tag_modifiers: BTreeMap::new(),
                event_pool: vec![EventId::from("surge")],
                travel_cost: 0,
                travel_days: 0,
                required_reputation: 0,
                theme_color: String::new(),
            },
            City {
                id: CityId::from("harbor"),
                name: String::from("Lantern Harbor"),
                description: String::new(),
                tag_modifiers: harbor_mods,
                event_pool: vec![EventId::from("surge")],
                travel_cost: 250,
                travel_days: 1,
                required_reputation: 100,
                theme_color: String::new(),
            },
        ],
        events: vec![surge],
    })
}

/// A fresh session with the given starting coins and scripted rolls.
pub fn session(coins: u64, rolls: &[f64]) -> GameSession<ScriptedRng> {
    let mut config = GameConfig::default();
    config.economy.starting_coins = coins;
    let state = PlayerState::new(&config.economy);
    GameSession::with_rng(Arc::new(catalog()), config, state, ScriptedRng::new(rolls))
}
