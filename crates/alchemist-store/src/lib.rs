//! Persistence collaborator for the Dream Alchemist economy.
//!
//! The engine consumes three operations from this crate: load the catalog,
//! load the player, save the player. Everything here degrades instead of
//! failing: a broken catalog becomes an empty one and a broken save becomes
//! a new game.
//!
//! # Modules
//!
//! - [`bootstrap`] -- Build a [`GameSession`] from a store ([`bootstrap()`])
//! - [`error`] -- Shared error types ([`StoreError`])
//! - [`json_file`] -- YAML catalog + JSON save on disk ([`JsonFileStore`])
//! - [`memory`] -- In-memory store ([`MemoryStore`])
//! - [`seed`] -- Seed parsing and the bundled catalog
//! - [`store`] -- The [`GameStore`] trait
//!
//! [`GameSession`]: alchemist_engine::GameSession

pub mod bootstrap;
pub mod error;
pub mod json_file;
pub mod memory;
pub mod seed;
pub mod store;

// Re-export primary types for convenience.
pub use bootstrap::{Bootstrapped, SaveOrigin, bootstrap, save_if_dirty};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use seed::bundled_seed;
pub use store::GameStore;
