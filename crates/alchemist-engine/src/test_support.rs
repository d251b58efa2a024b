//! Shared fixtures for unit tests.

use std::collections::{BTreeMap, BTreeSet};

use rand::RngCore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use alchemist_types::{
    City, CityId, ChoiceId, DreamTag, EventChoice, EventId, EventType, GameEvent, Ingredient,
    IngredientId, Rarity, Recipe, RecipeId,
};

use crate::catalog::{Catalog, CatalogSeed};
use crate::config::GameConfig;

/// An RNG that replays a fixed list of `f64` rolls.
///
/// Each call to `rng.random::<f64>()` yields the next scripted value; once the
/// script runs out every roll is `0.0`.
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
        u32::try_from(self.next_u64() >> 32).unwrap_or(0)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn next_u64(&mut self) -> u64 {
        let roll = self.rolls.get(self.next).copied().unwrap_or(0.0);
        self.next = self.next.saturating_add(1);
        // `random::<f64>()` keeps the top 53 bits and scales by 2^-53.
        let scaled = (roll.clamp(0.0, 1.0 - f64::EPSILON) * (1_u64 << 53) as f64) as u64;
        scaled << 11
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

/// Default configuration.
pub fn fixture_config() -> GameConfig {
    GameConfig::default()
}

fn ingredient(
    id: &str,
    name: &str,
    rarity: Rarity,
    base: Decimal,
    weight: u32,
    tags: &[DreamTag],
) -> Ingredient {
    Ingredient {
        id: IngredientId::from(id),
        name: name.to_owned(),
        description: String::new(),
        rarity,
        base_value: base,
        weight,
        volatile: false,
        tags: tags.iter().copied().collect(),
        color: String::from("#FFFFFF"),
        icon_id: String::new(),
    }
}

fn recipe(
    id: &str,
    name: &str,
    rarity: Rarity,
    ingredients: &[&str],
    multiplier: Decimal,
    discovered: bool,
    tags: &[DreamTag],
) -> Recipe {
    Recipe {
        id: RecipeId::from(id),
        name: name.to_owned(),
        description: String::new(),
        rarity,
        required_ingredients: ingredients
            .iter()
            .map(|i| IngredientId::from(*i))
            .collect::<BTreeSet<_>>(),
        alignment: String::from("lucid"),
        value_multiplier: multiplier,
        discovered,
        tags: tags.to_vec(),
        effect_id: None,
        narrative_text: None,
    }
}

fn city(id: &str, name: &str, cost: u64, days: u32, required: i32, pool: &[&str]) -> City {
    City {
        id: CityId::from(id),
        name: name.to_owned(),
        description: String::new(),
        tag_modifiers: BTreeMap::new(),
        event_pool: pool.iter().map(|e| EventId::from(*e)).collect(),
        travel_cost: cost,
        travel_days: days,
        required_reputation: required,
        theme_color: String::new(),
    }
}

fn event(id: &str, name: &str, event_type: EventType, probability: f64, duration: u32) -> GameEvent {
    GameEvent {
        id: EventId::from(id),
        name: name.to_owned(),
        description: String::new(),
        event_type,
        probability,
        duration,
        price_modifiers: BTreeMap::new(),
        tag_modifiers: BTreeMap::new(),
        reputation_effect: 0,
        narrative_text: String::new(),
        choices: None,
    }
}

/// A small catalog: five ingredients, three recipes, three cities, three events.
pub fn fixture_catalog() -> Catalog {
    let ingredients = vec![
        ingredient("starlight", "Starlight Essence", Rarity::Common, dec!(10), 1, &[DreamTag::Joyful, DreamTag::Lucid]),
        ingredient("moonstone", "Moonstone Dust", Rarity::Uncommon, dec!(25), 2, &[DreamTag::Mystical]),
        ingredient("shadow", "Shadow Silk", Rarity::Rare, dec!(60), 3, &[DreamTag::Dark, DreamTag::Fearful]),
        ingredient("echo", "Echo Shard", Rarity::Epic, dec!(150), 5, &[DreamTag::Nostalgic]),
        ingredient("void", "Void Pearl", Rarity::Legendary, dec!(400), 10, &[DreamTag::Dark, DreamTag::Surreal]),
    ];

    let mut lullaby = recipe(
        "shadow_lullaby",
        "Shadow Lullaby",
        Rarity::Rare,
        &["moonstone", "shadow"],
        dec!(2.5),
        true,
        &[DreamTag::Dark],
    );
    lullaby.narrative_text = Some(String::from("A lullaby hummed from the far side of sleep."));
    let recipes = vec![
        recipe(
            "recipe1",
            "Bright Reverie",
            Rarity::Uncommon,
            &["starlight", "moonstone"],
            dec!(2),
            false,
            &[DreamTag::Joyful, DreamTag::Mystical],
        ),
        lullaby,
        recipe(
            "echoing_abyss",
            "Echoing Abyss",
            Rarity::Legendary,
            &["shadow", "echo", "void"],
            dec!(3),
            false,
            &[DreamTag::Surreal],
        ),
    ];

    let mut bazaar = city("velvet_bazaar", "Velvet Bazaar", 300, 2, 10, &["lucid_fair"]);
    bazaar.tag_modifiers.insert(DreamTag::Nostalgic, dec!(1.5));
    let cities = vec![
        city(
            "somnia_terminal",
            "Somnia Terminal",
            0,
            0,
            0,
            &["dream_fog", "nightmare_raid", "lucid_fair"],
        ),
        bazaar,
        city("lucid_spire", "Lucid Spire", 1_000, 3, 100, &[]),
    ];

    let mut fog = event("dream_fog", "Dream Fog", EventType::Market, 0.5, 3);
    fog.price_modifiers.insert(IngredientId::from("starlight"), dec!(1.5));
    fog.tag_modifiers.insert(DreamTag::Mystical, dec!(2));

    let mut raid = event("nightmare_raid", "Nightmare Raid", EventType::Raid, 0.3, 2);
    raid.reputation_effect = -5;
    raid.choices = Some(vec![
        EventChoice {
            id: ChoiceId::from("bribe"),
            text: String::from("Bribe the patrol"),
            coins_cost: 200,
            reputation_effect: 3,
            item_rewards: BTreeMap::from([(IngredientId::from("starlight"), 2)]),
            result_text: Some(String::from("The patrol looks away.")),
        },
        EventChoice {
            id: ChoiceId::from("flee"),
            text: String::from("Run for it"),
            coins_cost: 0,
            reputation_effect: -2,
            item_rewards: BTreeMap::new(),
            result_text: None,
        },
    ]);

    let mut fair = event("lucid_fair", "Lucid Fair", EventType::Opportunity, 0.9, 4);
    fair.tag_modifiers.insert(DreamTag::Lucid, dec!(0.8));

    Catalog::from_seed(CatalogSeed {
        ingredients,
        recipes,
        cities,
        events: vec![fog, raid, fair],
    })
}
