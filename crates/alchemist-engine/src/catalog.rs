//! Static reference data: ingredients, recipes, cities, and events.
//!
//! The catalog is built once from seed records and is read-only afterwards,
//! so a session shares it behind an `Arc` with any number of readers.
//! Records that violate the entity invariants are dropped with a warning
//! during construction, and duplicate ids keep the first record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use alchemist_types::{City, CityId, EventId, GameEvent, Ingredient, IngredientId, Recipe, RecipeId};

/// Minimum number of distinct ingredients in a recipe.
pub const MIN_RECIPE_INGREDIENTS: usize = 2;

/// Maximum number of distinct ingredients in a recipe.
pub const MAX_RECIPE_INGREDIENTS: usize = 3;

/// Raw seed records as supplied by a persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    /// Ingredient records.
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Recipe records.
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    /// City records.
    #[serde(default)]
    pub cities: Vec<City>,
    /// Event records.
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

/// Validated, id-indexed reference data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, Recipe>,
    cities: BTreeMap<CityId, City>,
    events: BTreeMap<EventId, GameEvent>,
}

impl Catalog {
    /// Build a catalog from seed records, dropping invalid entries.
    pub fn from_seed(seed: CatalogSeed) -> Self {
        let mut catalog = Self::default();

        for ingredient in seed.ingredients {
            if ingredient.base_value <= rust_decimal::Decimal::ZERO || ingredient.weight == 0 {
                warn!(
                    ingredient_id = %ingredient.id,
                    base_value = %ingredient.base_value,
                    weight = ingredient.weight,
                    "dropping ingredient with non-positive value or weight"
                );
                continue;
            }
            insert_first(&mut catalog.ingredients, ingredient.id.clone(), ingredient, "ingredient");
        }

        for recipe in seed.recipes {
            let size = recipe.required_ingredients.len();
            if !(MIN_RECIPE_INGREDIENTS..=MAX_RECIPE_INGREDIENTS).contains(&size) {
                warn!(
                    recipe_id = %recipe.id,
                    size,
                    "dropping recipe with invalid ingredient count"
                );
                continue;
            }
            if recipe.value_multiplier <= rust_decimal::Decimal::ZERO {
                warn!(recipe_id = %recipe.id, "dropping recipe with non-positive multiplier");
                continue;
            }
            insert_first(&mut catalog.recipes, recipe.id.clone(), recipe, "recipe");
        }

        for city in seed.cities {
            insert_first(&mut catalog.cities, city.id.clone(), city, "city");
        }

        for event in seed.events {
            if !(0.0..=1.0).contains(&event.probability) || event.duration == 0 {
                warn!(
                    event_id = %event.id,
                    probability = event.probability,
                    duration = event.duration,
                    "dropping event with invalid probability or duration"
                );
                continue;
            }
            insert_first(&mut catalog.events, event.id.clone(), event, "event");
        }

        info!(
            ingredients = catalog.ingredients.len(),
            recipes = catalog.recipes.len(),
            cities = catalog.cities.len(),
            events = catalog.events.len(),
            "catalog loaded"
        );
        catalog
    }

    /// Return `true` if the catalog holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
            && self.recipes.is_empty()
            && self.cities.is_empty()
            && self.events.is_empty()
    }

    /// Look up an ingredient by id.
    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.get(id)
    }

    /// Look up a recipe by id.
    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    /// Look up a city by id.
    pub fn city(&self, id: &str) -> Option<&City> {
        self.cities.get(id)
    }

    /// Look up an event by id.
    pub fn event(&self, id: &str) -> Option<&GameEvent> {
        self.events.get(id)
    }

    /// Iterate over all ingredients in id order.
    pub fn ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    /// Iterate over all recipes in id order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    /// Iterate over all cities in id order.
    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// Iterate over all events in id order.
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.values()
    }

    /// Find the recipe whose required set equals the given set.
    pub fn find_recipe(&self, ingredients: &BTreeSet<IngredientId>) -> Option<&Recipe> {
        self.recipes
            .values()
            .find(|recipe| recipe.required_ingredients == *ingredients)
    }
}

fn insert_first<K: Ord + core::fmt::Display, V>(
    map: &mut BTreeMap<K, V>,
    key: K,
    value: V,
    kind: &'static str,
) {
    if map.contains_key(&key) {
        warn!(kind, id = %key, "duplicate catalog id, keeping the first record");
        return;
    }
    map.insert(key, value);
}
