//! Enumeration types for the Dream Alchemist economy.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Ordinal quality tier of an ingredient, recipe, or crafted dream.
///
/// The ordering is meaningful: `Common < Uncommon < Rare < Epic < Legendary`.
/// Each variant carries a 1-based ordinal used when averaging rarities during
/// experimental crafting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// Ordinal 1.
    Common,
    /// Ordinal 2.
    Uncommon,
    /// Ordinal 3.
    Rare,
    /// Ordinal 4.
    Epic,
    /// Ordinal 5.
    Legendary,
}

impl Rarity {
    /// All rarities in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    /// Return the 1-based ordinal of this rarity.
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
            Self::Epic => 4,
            Self::Legendary => 5,
        }
    }

    /// Map a 1-based ordinal back to a rarity.
    ///
    /// Returns `None` outside `1..=5`.
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(Self::Common),
            2 => Some(Self::Uncommon),
            3 => Some(Self::Rare),
            4 => Some(Self::Epic),
            5 => Some(Self::Legendary),
            _ => None,
        }
    }

    /// Map an ordinal to a rarity, clamping out-of-range values to the
    /// nearest valid tier.
    pub const fn from_ordinal_clamped(ordinal: i64) -> Self {
        if ordinal <= 1 {
            Self::Common
        } else if ordinal >= 5 {
            Self::Legendary
        } else {
            match ordinal {
                2 => Self::Uncommon,
                3 => Self::Rare,
                _ => Self::Epic,
            }
        }
    }
}

impl core::fmt::Display for Rarity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Dream tags
// ---------------------------------------------------------------------------

/// Semantic category carried by ingredients and recipes.
///
/// Cities and events attach price multipliers to tags, so a single tag
/// modifier affects every ingredient carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DreamTag {
    /// Bright, uplifting dream matter.
    Joyful,
    /// Sorrowful, wistful dream matter.
    Melancholic,
    /// Dread and nightmare fragments.
    Fearful,
    /// Memories of times past.
    Nostalgic,
    /// Self-aware dreaming.
    Lucid,
    /// Arcane and occult material.
    Mystical,
    /// Weightless, vaporous material.
    Ethereal,
    /// Shadowed, forbidden material.
    Dark,
    /// Longing and affection.
    Romantic,
    /// Illogical, shifting imagery.
    Surreal,
    /// Visions of what is to come.
    Prophetic,
    /// Unstable, violent material.
    Chaotic,
}

impl DreamTag {
    /// Lowercase display name used in generated narrative text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Joyful => "joy",
            Self::Melancholic => "melancholy",
            Self::Fearful => "fear",
            Self::Nostalgic => "nostalgia",
            Self::Lucid => "lucidity",
            Self::Mystical => "mysticism",
            Self::Ethereal => "ether",
            Self::Dark => "darkness",
            Self::Romantic => "romance",
            Self::Surreal => "the surreal",
            Self::Prophetic => "prophecy",
            Self::Chaotic => "chaos",
        }
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// The kind of a timed game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// Shifts market prices.
    Market,
    /// Random encounter.
    Random,
    /// Narrative progression.
    Story,
    /// Enforcement crackdown or danger.
    Raid,
    /// A special deal on offer.
    Opportunity,
    /// A new recipe or location surfaces.
    Discovery,
    /// Affects the player's standing.
    Reputation,
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Broad class of a refused operation.
///
/// Every refusal leaves the player state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ErrorCategory {
    /// Malformed request (bad count, zero quantity, duplicate activation).
    Validation,
    /// Not enough coins, inventory quantity, or carrying capacity.
    InsufficientResource,
    /// A referenced catalog entity or stash entry does not exist.
    NotFound,
    /// A reputation or location gate was not met.
    Ineligible,
}

/// Specific reason an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// Crafting requires two or three distinct ingredients.
    InvalidIngredientCount,
    /// A quantity of zero was requested.
    InvalidQuantity,
    /// The event is already running.
    EventAlreadyActive,
    /// The simultaneous-event cap has been reached.
    EventCapReached,
    /// The player lacks the coins for the operation.
    InsufficientCoins,
    /// The player holds fewer units than requested.
    InsufficientQuantity,
    /// One or more crafting ingredients are not held.
    MissingIngredients,
    /// The operation would exceed the carrying capacity.
    CapacityExceeded,
    /// Unknown ingredient id.
    UnknownIngredient,
    /// Unknown recipe id.
    UnknownRecipe,
    /// Unknown city id.
    UnknownCity,
    /// Unknown or inactive event id.
    UnknownEvent,
    /// Unknown choice id for the event.
    UnknownChoice,
    /// Unknown crafted dream id.
    UnknownDream,
    /// The player is already in the destination city.
    AlreadyInCity,
    /// Summed reputation is below the destination's requirement.
    ReputationTooLow,
    /// A computed amount left its representable range.
    ValueOutOfRange,
}

impl RejectionReason {
    /// Return the broad category of this reason.
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::InvalidIngredientCount
            | Self::InvalidQuantity
            | Self::EventAlreadyActive
            | Self::EventCapReached
            | Self::ValueOutOfRange => ErrorCategory::Validation,
            Self::InsufficientCoins
            | Self::InsufficientQuantity
            | Self::MissingIngredients
            | Self::CapacityExceeded => ErrorCategory::InsufficientResource,
            Self::UnknownIngredient
            | Self::UnknownRecipe
            | Self::UnknownCity
            | Self::UnknownEvent
            | Self::UnknownChoice
            | Self::UnknownDream => ErrorCategory::NotFound,
            Self::AlreadyInCity | Self::ReputationTooLow => ErrorCategory::Ineligible,
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory sorting
// ---------------------------------------------------------------------------

/// Ordering applied when listing the player's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum InventorySort {
    /// Alphabetical by ingredient name.
    #[default]
    Name,
    /// Rarest first, then by name.
    Rarity,
    /// Largest stack first, then by name.
    Quantity,
    /// Highest base value first, then by name.
    Value,
    /// Heaviest first, then by name.
    Weight,
}
