//! Inventory operations for the player.
//!
//! The player carries ingredients subject to a weight limit (`max_weight`).
//! Every unit of an ingredient weighs the catalog's `weight`. This module
//! adds, removes, and queries stacks with checked arithmetic, keeping
//! `current_weight` in step with the inventory.

use std::cmp::Reverse;

use alchemist_types::{IngredientId, InventoryItem, InventorySort};

use crate::catalog::Catalog;
use crate::error::GameError;
use crate::player::PlayerState;

/// Weight of `quantity` units of an ingredient.
pub fn stack_weight(catalog: &Catalog, ingredient_id: &str, quantity: u32) -> Result<u32, GameError> {
    let ingredient = catalog
        .ingredient(ingredient_id)
        .ok_or_else(|| GameError::UnknownIngredient(IngredientId::from(ingredient_id)))?;
    ingredient
        .weight
        .checked_mul(quantity)
        .ok_or_else(|| GameError::overflow("stack weight"))
}

/// Free carrying capacity.
pub const fn available_space(state: &PlayerState) -> u32 {
    state.max_weight.saturating_sub(state.current_weight)
}

/// Whether `quantity` units of the ingredient fit in the remaining capacity.
pub fn can_carry(
    state: &PlayerState,
    catalog: &Catalog,
    ingredient_id: &str,
    quantity: u32,
) -> Result<bool, GameError> {
    let weight = stack_weight(catalog, ingredient_id, quantity)?;
    Ok(weight <= available_space(state))
}

/// Add `quantity` units of an ingredient.
///
/// Fails if the addition would exceed the carrying capacity.
pub fn add_items(
    state: &mut PlayerState,
    catalog: &Catalog,
    ingredient_id: &str,
    quantity: u32,
) -> Result<(), GameError> {
    if quantity == 0 {
        return Err(GameError::InvalidQuantity);
    }
    let weight = stack_weight(catalog, ingredient_id, quantity)?;
    let space = available_space(state);
    if weight > space {
        return Err(GameError::CapacityExceeded {
            required: weight,
            available: space,
        });
    }

    let entry = state
        .inventory
        .entry(IngredientId::from(ingredient_id))
        .or_insert(0);
    *entry = entry
        .checked_add(quantity)
        .ok_or_else(|| GameError::overflow("stack quantity"))?;
    state.current_weight = state
        .current_weight
        .checked_add(weight)
        .ok_or_else(|| GameError::overflow("carried weight"))?;
    Ok(())
}

/// Remove `quantity` units of an ingredient.
///
/// Fails if the player holds fewer units. Removes the entry when it reaches
/// zero.
pub fn remove_items(
    state: &mut PlayerState,
    catalog: &Catalog,
    ingredient_id: &str,
    quantity: u32,
) -> Result<(), GameError> {
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
    // Ingredients dropped from the catalog since the save weigh nothing.
    let weight = stack_weight(catalog, ingredient_id, quantity).unwrap_or(0);

    let remaining = held.saturating_sub(quantity);
    if remaining == 0 {
        state.inventory.remove(ingredient_id);
    } else {
        state
            .inventory
            .insert(IngredientId::from(ingredient_id), remaining);
    }
    state.current_weight = state.current_weight.saturating_sub(weight);
    Ok(())
}

/// Raise the maximum carrying weight.
pub fn upgrade_capacity(state: &mut PlayerState, amount: u32) -> Result<u32, GameError> {
    state.max_weight = state
        .max_weight
        .checked_add(amount)
        .ok_or_else(|| GameError::overflow("carrying capacity"))?;
    Ok(state.max_weight)
}

/// List held ingredients resolved against the catalog.
///
/// Ids no longer in the catalog are skipped. Ties in the chosen ordering
/// fall back to the ingredient name.
pub fn items(state: &PlayerState, catalog: &Catalog, sort: InventorySort) -> Vec<InventoryItem> {
    let mut items: Vec<InventoryItem> = state
        .inventory
        .iter()
        .filter_map(|(id, qty)| {
            let ingredient = catalog.ingredient(id.as_str())?;
            Some(InventoryItem {
                ingredient_id: id.clone(),
                name: ingredient.name.clone(),
                rarity: ingredient.rarity,
                quantity: *qty,
                base_value: ingredient.base_value,
                unit_weight: ingredient.weight,
                total_weight: ingredient.weight.saturating_mul(*qty),
            })
        })
        .collect();

    items.sort_by(|a, b| a.name.cmp(&b.name));
    match sort {
        InventorySort::Name => {}
        InventorySort::Rarity => items.sort_by_key(|i| Reverse(i.rarity)),
        InventorySort::Quantity => items.sort_by_key(|i| Reverse(i.quantity)),
        InventorySort::Value => items.sort_by_key(|i| Reverse(i.base_value)),
        InventorySort::Weight => items.sort_by_key(|i| Reverse(i.unit_weight)),
    }
    items
}
