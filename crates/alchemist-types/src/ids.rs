//! Type-safe identifier wrappers.
//!
//! Catalog entities (ingredients, recipes, cities, events, event choices) are
//! keyed by stable human-readable slugs such as `"somnia_terminal"`, because
//! seed data and save files reference them by name. Crafted dreams are minted
//! at runtime and use UUID v7 (time-ordered) instead.

use core::borrow::Borrow;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a catalog slug with standard derives.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return `true` if the identifier is the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key! {
    /// Catalog identifier of a tradeable ingredient.
    IngredientId
}

define_key! {
    /// Catalog identifier of a crafting recipe.
    RecipeId
}

define_key! {
    /// Catalog identifier of a city (market location).
    CityId
}

define_key! {
    /// Catalog identifier of a timed game event.
    EventId
}

define_key! {
    /// Identifier of a choice within a single event's choice list.
    ChoiceId
}

/// Unique identifier for a crafted dream in the player's stash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DreamId(pub Uuid);

impl DreamId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for DreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for DreamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DreamId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
