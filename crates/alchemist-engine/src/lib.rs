//! The Dream Alchemist simulation core.
//!
//! This crate contains every rule of the economy and none of its I/O. It
//! sits between `alchemist-types` (the data structures) and the store and
//! CLI crates (persistence and orchestration). All operations are
//! synchronous transformations of a single [`PlayerState`].
//!
//! # Modules
//!
//! - [`catalog`] -- Read-only reference data with load-time validation ([`Catalog`])
//! - [`config`] -- YAML configuration with defaults for every constant ([`GameConfig`])
//! - [`crafting`] -- Known-recipe crafting and experimental synthesis
//! - [`error`] -- Error taxonomy for refused operations ([`GameError`])
//! - [`events`] -- Event rolls, activation, expiry, and choice resolution
//! - [`inventory`] -- Weight-limited ingredient stacks
//! - [`player`] -- The player aggregate ([`PlayerState`])
//! - [`pricing`] -- Deterministic price formula, market board, and trading
//! - [`reputation`] -- Clamped reputation axes and tier progression
//! - [`session`] -- The public facade returning [`GameResult`]s ([`GameSession`])
//! - [`travel`] -- Travel eligibility and trips between cities
//!
//! [`GameResult`]: alchemist_types::GameResult

pub mod catalog;
pub mod config;
pub mod crafting;
pub mod error;
pub mod events;
pub mod inventory;
pub mod player;
pub mod pricing;
pub mod reputation;
pub mod session;
pub mod travel;

#[cfg(test)]
mod test_support;

// Re-export primary types at crate root for convenience.
pub use catalog::{Catalog, CatalogSeed};
pub use config::{ConfigError, GameConfig};
pub use error::GameError;
pub use player::PlayerState;
pub use pricing::PricingEngine;
pub use reputation::{Reputation, ReputationDelta, TierChange};
pub use session::GameSession;
