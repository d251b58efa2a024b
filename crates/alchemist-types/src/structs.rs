//! Catalog entities and the crafted-dream artifact.
//!
//! Catalog entities ([`Ingredient`], [`Recipe`], [`City`], [`GameEvent`]) are
//! created once when the catalog is loaded and never mutated afterwards. They
//! double as the seed-record schema, so optional display fields default when
//! absent from seed files.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DreamTag, EventType, Rarity};
use crate::ids::{ChoiceId, CityId, DreamId, EventId, IngredientId, RecipeId};

// ---------------------------------------------------------------------------
// Ingredient
// ---------------------------------------------------------------------------

/// A tradeable commodity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ingredient {
    /// Catalog identifier.
    pub id: IngredientId,
    /// Display name. The first whitespace-separated token names experimental dreams.
    pub name: String,
    /// Flavor description.
    #[serde(default)]
    pub description: String,
    /// Quality tier; drives the rarity price modifier and market stock.
    pub rarity: Rarity,
    /// Base price in coins (positive).
    #[ts(as = "String")]
    pub base_value: Decimal,
    /// Carrying weight per unit (positive).
    pub weight: u32,
    /// Whether this ingredient is prone to volatile price swings.
    #[serde(default)]
    pub volatile: bool,
    /// Semantic categories used by city and event tag modifiers.
    #[serde(default)]
    pub tags: BTreeSet<DreamTag>,
    /// Display color (hex).
    #[serde(default = "default_color")]
    pub color: String,
    /// Icon identifier for the surrounding UI.
    #[serde(default)]
    pub icon_id: String,
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A combination of ingredient ids that yields a crafted dream.
///
/// The required ingredients form a set: duplicates in seed data collapse,
/// and matching is by set equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recipe {
    /// Catalog identifier.
    pub id: RecipeId,
    /// Display name, also used as the crafted dream's name.
    pub name: String,
    /// Flavor description.
    #[serde(default)]
    pub description: String,
    /// Rarity of the dream this recipe produces.
    pub rarity: Rarity,
    /// Required ingredient ids (2 to 3 distinct ids).
    pub required_ingredients: BTreeSet<IngredientId>,
    /// Dream alignment label, e.g. "melancholic".
    #[serde(default)]
    pub alignment: String,
    /// Multiplier applied to the summed base value of the ingredients.
    #[ts(as = "String")]
    pub value_multiplier: Decimal,
    /// Whether the recipe is known from the start of a new game.
    #[serde(default)]
    pub discovered: bool,
    /// Tags of the produced dream; the first entry is the primary tag.
    #[serde(default)]
    pub tags: Vec<DreamTag>,
    /// Optional special effect identifier.
    #[serde(default)]
    pub effect_id: Option<String>,
    /// Optional authored narrative; generated when absent.
    #[serde(default)]
    pub narrative_text: Option<String>,
}

impl Recipe {
    /// Return the primary tag, if the recipe has any tags.
    pub fn primary_tag(&self) -> Option<DreamTag> {
        self.tags.first().copied()
    }
}

// ---------------------------------------------------------------------------
// City
// ---------------------------------------------------------------------------

/// A market location the player can travel to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct City {
    /// Catalog identifier.
    pub id: CityId,
    /// Display name.
    pub name: String,
    /// Flavor description.
    #[serde(default)]
    pub description: String,
    /// Per-tag price multipliers applied in this city's market.
    #[serde(default)]
    #[ts(type = "Record<string, string>")]
    pub tag_modifiers: BTreeMap<DreamTag, Decimal>,
    /// Events that can roll while the player is in this city.
    #[serde(default)]
    pub event_pool: Vec<EventId>,
    /// Coins charged to travel here.
    #[serde(default)]
    pub travel_cost: u64,
    /// Days the journey takes.
    #[serde(default)]
    pub travel_days: u32,
    /// Minimum summed reputation required to enter; may be negative.
    #[serde(default)]
    pub required_reputation: i32,
    /// Display theme color (hex).
    #[serde(default = "default_color")]
    pub theme_color: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A player decision offered by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventChoice {
    /// Identifier, unique within the owning event.
    pub id: ChoiceId,
    /// Text shown for the option.
    pub text: String,
    /// Coins paid when choosing this option.
    #[serde(default)]
    pub coins_cost: u64,
    /// Trust delta applied when choosing this option.
    #[serde(default)]
    pub reputation_effect: i32,
    /// Ingredients granted when choosing this option.
    #[serde(default)]
    pub item_rewards: BTreeMap<IngredientId, u32>,
    /// Text shown after the choice resolves.
    #[serde(default)]
    pub result_text: Option<String>,
}

/// A timed modifier to prices and reputation.
///
/// The variant is carried by [`EventType`]; events that ask the player to
/// decide something carry their options in `choices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Catalog identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Flavor description.
    #[serde(default)]
    pub description: String,
    /// Event kind.
    pub event_type: EventType,
    /// Chance in `[0, 1]` that the event triggers when rolled.
    pub probability: f64,
    /// Days the event stays active once triggered (positive).
    pub duration: u32,
    /// Per-ingredient price multipliers.
    #[serde(default)]
    #[ts(type = "Record<string, string>")]
    pub price_modifiers: BTreeMap<IngredientId, Decimal>,
    /// Per-tag price multipliers.
    #[serde(default)]
    #[ts(type = "Record<string, string>")]
    pub tag_modifiers: BTreeMap<DreamTag, Decimal>,
    /// Trust delta applied once when the event triggers.
    #[serde(default)]
    pub reputation_effect: i32,
    /// Narrative shown when the event triggers.
    #[serde(default)]
    pub narrative_text: String,
    /// Optional decisions offered to the player.
    #[serde(default)]
    pub choices: Option<Vec<EventChoice>>,
}

impl GameEvent {
    /// Look up a choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices
            .as_deref()
            .and_then(|choices| choices.iter().find(|c| c.id.as_str() == choice_id))
    }
}

/// A live instance of a [`GameEvent`] scoped to one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveEvent {
    /// The catalog event this instance runs.
    pub event_id: EventId,
    /// The city whose market the event affects.
    pub city_id: CityId,
    /// Days left before expiry. The instance is removed once this reaches 0.
    pub days_remaining: u32,
    /// Game day on which the event triggered.
    #[serde(default)]
    pub started_on_day: u32,
}

impl ActiveEvent {
    /// Whether the instance has run out of days.
    pub const fn is_expired(&self) -> bool {
        self.days_remaining == 0
    }
}

// ---------------------------------------------------------------------------
// Crafted dreams
// ---------------------------------------------------------------------------

/// A crafted artifact held in the player's stash until sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CraftedDream {
    /// Unique identifier.
    pub id: DreamId,
    /// Recipe used, or `None` for experimental dreams.
    pub recipe_id: Option<RecipeId>,
    /// Display name.
    pub name: String,
    /// Sale value in coins.
    #[ts(as = "String")]
    pub value: Decimal,
    /// Quality tier.
    pub rarity: Rarity,
    /// Flavor text describing the dream.
    pub narrative_text: String,
    /// Game day on which the dream was crafted.
    pub crafted_on_day: u32,
    /// Wall-clock creation time.
    pub crafted_at: DateTime<Utc>,
}

fn default_color() -> String {
    "#8B5CF6".to_owned()
}
