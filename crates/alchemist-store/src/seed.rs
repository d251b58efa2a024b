//! Catalog seed data.
//!
//! The catalog ships as four YAML documents, one list per section. A copy
//! is bundled into the binary so a fresh install can play without a
//! catalog directory on disk.

use serde::de::DeserializeOwned;
use tracing::warn;

use alchemist_engine::CatalogSeed;

use crate::error::StoreError;

/// Seed file for ingredients.
pub const INGREDIENTS_FILE: &str = "ingredients.yaml";
/// Seed file for recipes.
pub const RECIPES_FILE: &str = "recipes.yaml";
/// Seed file for cities.
pub const CITIES_FILE: &str = "cities.yaml";
/// Seed file for events.
pub const EVENTS_FILE: &str = "events.yaml";

const BUNDLED_INGREDIENTS: &str = include_str!("../seed/ingredients.yaml");
const BUNDLED_RECIPES: &str = include_str!("../seed/recipes.yaml");
const BUNDLED_CITIES: &str = include_str!("../seed/cities.yaml");
const BUNDLED_EVENTS: &str = include_str!("../seed/events.yaml");

/// Whether a YAML document holds nothing but blank lines and comments.
fn is_blank(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Parse one seed section. A blank document is an empty list.
pub fn parse_section<T: DeserializeOwned>(section: &str, yaml: &str) -> Result<Vec<T>, StoreError> {
    if is_blank(yaml) {
        return Ok(Vec::new());
    }
    serde_yml::from_str(yaml).map_err(|e| StoreError::Seed {
        section: section.to_owned(),
        message: e.to_string(),
    })
}

/// Parse one seed section, degrading to an empty list on error.
pub fn parse_section_or_empty<T: DeserializeOwned>(section: &str, yaml: &str) -> Vec<T> {
    parse_section(section, yaml).unwrap_or_else(|e| {
        warn!(section, error = %e, "seed section unreadable, using an empty list");
        Vec::new()
    })
}

/// The catalog seed compiled into the binary.
pub fn bundled_seed() -> CatalogSeed {
    CatalogSeed {
        ingredients: parse_section_or_empty("ingredients", BUNDLED_INGREDIENTS),
        recipes: parse_section_or_empty("recipes", BUNDLED_RECIPES),
        cities: parse_section_or_empty("cities", BUNDLED_CITIES),
        events: parse_section_or_empty("events", BUNDLED_EVENTS),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alchemist_engine::Catalog;
    use alchemist_types::{Ingredient, Rarity};

    use super::*;

    #[test]
    fn bundled_seed_parses_completely() {
        let seed = bundled_seed();
        assert_eq!(seed.ingredients.len(), 15);
        assert_eq!(seed.recipes.len(), 9);
        assert_eq!(seed.cities.len(), 5);
        assert_eq!(seed.events.len(), 8);
    }

    #[test]
    fn bundled_seed_survives_validation() {
        let seed = bundled_seed();
        let counts = (
            seed.ingredients.len(),
            seed.recipes.len(),
            seed.cities.len(),
            seed.events.len(),
        );
        let catalog = Catalog::from_seed(seed);
        assert_eq!(catalog.ingredients().count(), counts.0);
        assert_eq!(catalog.recipes().count(), counts.1);
        assert_eq!(catalog.cities().count(), counts.2);
        assert_eq!(catalog.events().count(), counts.3);
        assert!(catalog.city("somnia_terminal").is_some());
    }

    #[test]
    fn bundled_references_resolve() {
        let catalog = Catalog::from_seed(bundled_seed());
        for recipe in catalog.recipes() {
            for id in &recipe.required_ingredients {
                assert!(catalog.ingredient(id.as_str()).is_some(), "{} needs {id}", recipe.id);
            }
        }
        for city in catalog.cities() {
            for id in &city.event_pool {
                assert!(catalog.event(id.as_str()).is_some(), "{} pools {id}", city.id);
            }
        }
        for event in catalog.events() {
            for id in event.price_modifiers.keys() {
                assert!(catalog.ingredient(id.as_str()).is_some(), "{} modifies {id}", event.id);
            }
            for choice in event.choices.iter().flatten() {
                for id in choice.item_rewards.keys() {
                    assert!(catalog.ingredient(id.as_str()).is_some(), "{} rewards {id}", event.id);
                }
            }
        }
    }

    #[test]
    fn blank_and_broken_sections() {
        let empty: Vec<Ingredient> = parse_section("ingredients", "# nothing yet\n\n").unwrap();
        assert!(empty.is_empty());

        let broken = parse_section::<Ingredient>("ingredients", "- id: [unterminated");
        assert!(matches!(broken, Err(StoreError::Seed { .. })));
        assert!(parse_section_or_empty::<Ingredient>("ingredients", "- id: [unterminated").is_empty());
    }

    #[test]
    fn decimals_and_enums_parse_from_yaml() {
        let yaml = "- id: dew\n  name: Dew\n  rarity: Epic\n  base_value: \"12.5\"\n  weight: 2\n  tags: [Lucid]\n";
        let parsed: Vec<Ingredient> = parse_section("ingredients", yaml).unwrap();
        let dew = parsed.first().unwrap();
        assert_eq!(dew.rarity, Rarity::Epic);
        assert_eq!(dew.base_value.to_string(), "12.5");
        assert_eq!(dew.color, "#8B5CF6");
    }
}
