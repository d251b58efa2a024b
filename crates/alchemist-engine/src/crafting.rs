//! Crafting resolution: known recipes and experimental synthesis.
//!
//! A craft request names two or three ingredient ids. Duplicates collapse
//! (recipes are matched by set equality), and one unit of each distinct id
//! is consumed. When the set matches a catalog recipe the known-recipe path
//! runs; otherwise the experimental path rolls for success with
//! `experimental_base_chance + lucidity / lucidity_divisor`.
//!
//! # Outcomes
//!
//! | Path | Consumes | Produces | Lucidity |
//! |------|----------|----------|----------|
//! | Known recipe | one of each | dream valued `sum(base) x multiplier` | `+discovery bonus` on first craft |
//! | Experiment succeeds | one of each | dream valued `sum(base) x 1.2` | `+experimental bonus` |
//! | Experiment fails | one of each | nothing | none |

use std::collections::BTreeSet;

use chrono::Utc;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use alchemist_types::{
    CraftReport, CraftedDream, DreamId, Ingredient, IngredientId, Rarity, Recipe, RecipeId,
};

use crate::catalog::{Catalog, MAX_RECIPE_INGREDIENTS, MIN_RECIPE_INGREDIENTS};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::inventory;
use crate::player::PlayerState;
use crate::reputation::{self, ReputationDelta};

/// Narrative for a failed experiment.
const FAILED_NARRATIVE: &str =
    "The dream ingredients refused to coalesce, their essences scattering like morning mist.";

/// Message for a failed experiment.
const FAILED_MESSAGE: &str =
    "The ingredients dissolved into meaningless fragments. Experiment failed.";

// ---------------------------------------------------------------------------
// Crafting
// ---------------------------------------------------------------------------

/// Craft from two or three ingredient ids.
pub fn craft(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
    ingredient_ids: &[IngredientId],
) -> Result<CraftReport, GameError> {
    let distinct = validate_selection(state, ingredient_ids)?;
    let ingredients = distinct
        .iter()
        .map(|id| {
            catalog
                .ingredient(id.as_str())
                .ok_or_else(|| GameError::UnknownIngredient(id.clone()))
        })
        .collect::<Result<Vec<&Ingredient>, _>>()?;

    let selection: BTreeSet<IngredientId> = distinct.iter().cloned().collect();
    let recipe = catalog.find_recipe(&selection);

    for id in &distinct {
        inventory::remove_items(state, catalog, id.as_str(), 1)?;
    }

    match recipe {
        Some(recipe) => craft_known(state, catalog, config, recipe, &ingredients, distinct),
        None => craft_experimental(state, config, rng, &ingredients, distinct),
    }
}

/// Craft a recipe from its required ingredients.
pub fn craft_recipe(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
    recipe_id: &str,
) -> Result<CraftReport, GameError> {
    let recipe = catalog
        .recipe(recipe_id)
        .ok_or_else(|| GameError::UnknownRecipe(RecipeId::from(recipe_id)))?;
    let ids: Vec<IngredientId> = recipe.required_ingredients.iter().cloned().collect();
    craft(state, catalog, config, rng, &ids)
}

/// Check the count and that every distinct id is held.
///
/// Returns the distinct ids in the order first supplied.
fn validate_selection(
    state: &PlayerState,
    ingredient_ids: &[IngredientId],
) -> Result<Vec<IngredientId>, GameError> {
    let count = ingredient_ids.len();
    if !(MIN_RECIPE_INGREDIENTS..=MAX_RECIPE_INGREDIENTS).contains(&count) {
        return Err(GameError::InvalidIngredientCount { count });
    }

    let mut distinct: Vec<IngredientId> = Vec::with_capacity(count);
    for id in ingredient_ids {
        if !distinct.contains(id) {
            distinct.push(id.clone());
        }
    }
    if distinct.len() < MIN_RECIPE_INGREDIENTS {
        return Err(GameError::InvalidIngredientCount {
            count: distinct.len(),
        });
    }

    let missing: Vec<IngredientId> = distinct
        .iter()
        .filter(|id| !state.holds(id.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(GameError::MissingIngredients { missing });
    }
    Ok(distinct)
}

fn sum_base_values(ingredients: &[&Ingredient]) -> Result<Decimal, GameError> {
    ingredients
        .iter()
        .try_fold(Decimal::ZERO, |total, i| total.checked_add(i.base_value))
        .ok_or_else(|| GameError::overflow("ingredient value sum"))
}

fn craft_known(
    state: &mut PlayerState,
    catalog: &Catalog,
    config: &GameConfig,
    recipe: &Recipe,
    ingredients: &[&Ingredient],
    consumed: Vec<IngredientId>,
) -> Result<CraftReport, GameError> {
    let value = sum_base_values(ingredients)?
        .checked_mul(recipe.value_multiplier)
        .ok_or_else(|| GameError::overflow("dream value"))?;
    let narrative = recipe
        .narrative_text
        .clone()
        .unwrap_or_else(|| recipe_narrative(recipe, ingredients));

    let dream = CraftedDream {
        id: DreamId::new(),
        recipe_id: Some(recipe.id.clone()),
        name: recipe.name.clone(),
        value,
        rarity: recipe.rarity,
        narrative_text: narrative.clone(),
        crafted_on_day: state.current_day,
        crafted_at: Utc::now(),
    };
    state.crafted_dreams.push(dream.clone());

    let new_discovery = !state.knows_recipe(catalog, recipe.id.as_str());
    if new_discovery {
        state.discovered_recipes.insert(recipe.id.clone());
        reputation::update_reputation(
            state,
            ReputationDelta::lucidity(config.crafting.discovery_lucidity_bonus),
            &config.progression,
        );
    }

    info!(
        recipe_id = %recipe.id,
        dream_id = %dream.id,
        value = %value,
        new_discovery,
        "dream crafted"
    );

    Ok(CraftReport {
        recipe_id: Some(recipe.id.clone()),
        recipe_name: Some(recipe.name.clone()),
        dream: Some(dream),
        new_discovery,
        experimental: false,
        narrative_text: narrative,
        consumed,
    })
}

/// Success chance of an experiment for a lucidity value, in `[0, 1]`.
pub fn experimental_chance(config: &GameConfig, lucidity: i32) -> f64 {
    let crafting = &config.crafting;
    let bonus = if crafting.lucidity_divisor > 0.0 {
        f64::from(lucidity) / crafting.lucidity_divisor
    } else {
        0.0
    };
    (crafting.experimental_base_chance + bonus).clamp(0.0, 1.0)
}

fn craft_experimental(
    state: &mut PlayerState,
    config: &GameConfig,
    rng: &mut impl Rng,
    ingredients: &[&Ingredient],
    consumed: Vec<IngredientId>,
) -> Result<CraftReport, GameError> {
    let chance = experimental_chance(config, state.reputation.lucidity());
    let roll: f64 = rng.random();

    if roll >= chance {
        info!(chance, roll, "experiment failed");
        return Ok(CraftReport {
            recipe_id: None,
            recipe_name: None,
            dream: None,
            new_discovery: false,
            experimental: true,
            narrative_text: FAILED_NARRATIVE.to_owned(),
            consumed,
        });
    }

    let value = sum_base_values(ingredients)?
        .checked_mul(config.crafting.experimental_value_multiplier)
        .ok_or_else(|| GameError::overflow("experimental dream value"))?;
    let rarity = mean_rarity(ingredients);
    let first = ingredients.first().map_or("Unknown", |i| first_token(&i.name));
    let second = ingredients.get(1).map_or("Unknown", |i| first_token(&i.name));
    let narrative = format!(
        "An experimental fusion of dream fragments. The {first} dominates the composition, \
         creating an unpredictable yet stable dream construct."
    );

    let dream = CraftedDream {
        id: DreamId::new(),
        recipe_id: None,
        name: format!("Experimental {first}-{second} Dream"),
        value,
        rarity,
        narrative_text: narrative.clone(),
        crafted_on_day: state.current_day,
        crafted_at: Utc::now(),
    };
    state.crafted_dreams.push(dream.clone());

    reputation::update_reputation(
        state,
        ReputationDelta::lucidity(config.crafting.experimental_lucidity_bonus),
        &config.progression,
    );

    info!(
        dream_id = %dream.id,
        name = %dream.name,
        rarity = %rarity,
        value = %value,
        chance,
        "experiment succeeded"
    );

    Ok(CraftReport {
        recipe_id: None,
        recipe_name: None,
        dream: Some(dream),
        new_discovery: false,
        experimental: true,
        narrative_text: narrative,
        consumed,
    })
}

/// Human-readable summary of a craft.
pub fn outcome_message(report: &CraftReport) -> String {
    match (&report.dream, report.new_discovery, report.experimental) {
        (None, _, _) => FAILED_MESSAGE.to_owned(),
        (Some(dream), true, _) => format!("Discovery! You've created: {}", dream.name),
        (Some(dream), false, true) => format!("Experiment succeeded! You've created: {}", dream.name),
        (Some(dream), false, false) => format!("Successfully crafted: {}", dream.name),
    }
}

/// Mean rarity ordinal, rounded half to even and clamped to a valid tier.
pub fn mean_rarity(ingredients: &[&Ingredient]) -> Rarity {
    let count = Decimal::from(ingredients.len());
    let sum: Decimal = ingredients
        .iter()
        .map(|i| Decimal::from(i.rarity.ordinal()))
        .sum();
    let ordinal = sum
        .checked_div(count)
        .map(|mean| mean.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_i64())
        .unwrap_or(1);
    Rarity::from_ordinal_clamped(ordinal)
}

fn first_token(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

fn recipe_narrative(recipe: &Recipe, ingredients: &[&Ingredient]) -> String {
    let names = ingredients
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let essence = recipe.primary_tag().map_or("the unknown", |t| t.label());
    let alignment = if recipe.alignment.is_empty() {
        "nameless"
    } else {
        recipe.alignment.as_str()
    };
    format!(
        "By combining {names}, you've woven {}. This {alignment} dream carries the essence of {essence}.",
        recipe.name
    )
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Whether the player holds every ingredient the recipe requires.
pub fn can_craft_recipe(state: &PlayerState, catalog: &Catalog, recipe_id: &str) -> bool {
    catalog.recipe(recipe_id).is_some_and(|recipe| {
        recipe
            .required_ingredients
            .iter()
            .all(|id| state.holds(id.as_str()))
    })
}

/// Recipes the player knows, in id order.
pub fn known_recipes(state: &PlayerState, catalog: &Catalog) -> Vec<Recipe> {
    catalog
        .recipes()
        .filter(|r| state.knows_recipe(catalog, r.id.as_str()))
        .cloned()
        .collect()
}

/// Known recipes suggested for crafting: those with at least one required
/// ingredient in the inventory.
pub fn craftable_recipes(state: &PlayerState, catalog: &Catalog) -> Vec<Recipe> {
    catalog
        .recipes()
        .filter(|r| state.knows_recipe(catalog, r.id.as_str()))
        .filter(|r| r.required_ingredients.iter().any(|id| state.holds(id.as_str())))
        .cloned()
        .collect()
}
