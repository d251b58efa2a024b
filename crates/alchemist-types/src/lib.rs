//! Shared type definitions for the Dream Alchemist economy.
//!
//! This crate is the single source of truth for all types used across the
//! workspace. Types defined here flow downstream to `TypeScript` via `ts-rs`
//! for the surrounding game client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for catalog keys and crafted-dream ids
//! - [`enums`] -- Enumeration types (rarity, tags, event kinds, rejections)
//! - [`structs`] -- Catalog entities, active events, and crafted dreams
//! - [`reports`] -- Result envelope and read models returned by the session

pub mod enums;
pub mod ids;
pub mod reports;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DreamTag, ErrorCategory, EventType, InventorySort, Rarity, RejectionReason};
pub use ids::{ChoiceId, CityId, DreamId, EventId, IngredientId, RecipeId};
pub use reports::{
    ActiveEventView, ChoiceReport, CraftReport, DayReport, DreamSaleReceipt, GameResult,
    InventoryItem, MarketPrice, MarketTrend, PricePoint, PurchaseReceipt, Rejection,
    ReputationSnapshot, SaleReceipt, TravelCost, TravelReport, TrendDirection,
};
pub use structs::{ActiveEvent, City, CraftedDream, EventChoice, GameEvent, Ingredient, Recipe};
