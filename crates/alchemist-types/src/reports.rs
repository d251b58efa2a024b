//! Result envelopes and read models returned by the game session.
//!
//! Every public operation returns a [`GameResult`]: a success flag, a
//! human-readable message, an optional payload, and on refusal a
//! [`Rejection`] naming the reason. Callers never see a Rust `Err` from a
//! game operation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DreamTag, ErrorCategory, Rarity, RejectionReason};
use crate::ids::{ChoiceId, CityId, DreamId, EventId, IngredientId, RecipeId};
use crate::structs::{CraftedDream, GameEvent};

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rejection {
    /// Specific reason.
    pub reason: RejectionReason,
    /// Broad class of the reason.
    pub category: ErrorCategory,
    /// Human-readable explanation.
    pub message: String,
}

impl Rejection {
    /// Build a rejection, deriving the category from the reason.
    pub fn new(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            category: reason.category(),
            message: message.into(),
        }
    }
}

/// Outcome of a game operation.
///
/// `success` is false either because the operation was refused (then
/// `rejection` is set and the state is unchanged) or because it ran to
/// completion with an unfavorable outcome such as a failed experiment (then
/// `rejection` is `None` and `payload` describes what happened).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameResult<T> {
    /// Whether the operation achieved its goal.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Produced artifact, if any.
    pub payload: Option<T>,
    /// Refusal details, present only when the operation was refused.
    pub rejection: Option<Rejection>,
}

impl<T> GameResult<T> {
    /// A successful outcome carrying a payload.
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Some(payload),
            rejection: None,
        }
    }

    /// A completed but unsuccessful outcome that still changed the state.
    pub fn failed(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: Some(payload),
            rejection: None,
        }
    }

    /// A completed operation that produced nothing.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
            rejection: None,
        }
    }

    /// A refused operation.
    pub fn rejected(rejection: Rejection) -> Self {
        Self {
            success: false,
            message: rejection.message.clone(),
            payload: None,
            rejection: Some(rejection),
        }
    }

    /// Return the rejection reason, if the operation was refused.
    pub fn reason(&self) -> Option<RejectionReason> {
        self.rejection.as_ref().map(|r| r.reason)
    }

    /// Whether the operation was refused.
    pub const fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// One row of a city's market board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketPrice {
    /// Ingredient id.
    pub ingredient_id: IngredientId,
    /// Ingredient name.
    pub name: String,
    /// Ingredient rarity.
    pub rarity: Rarity,
    /// Price today in the city.
    #[ts(as = "String")]
    pub current_price: Decimal,
    /// Catalog base value.
    #[ts(as = "String")]
    pub base_price: Decimal,
    /// `(current - base) / base * 100`.
    #[ts(as = "String")]
    pub change_percent: Decimal,
    /// Whether the absolute change exceeds the trend threshold.
    pub is_trending: bool,
    /// Units the market has on offer.
    pub available_quantity: u32,
    /// Ingredient tags.
    pub tags: Vec<DreamTag>,
    /// Display color.
    pub color: String,
    /// Icon identifier.
    pub icon_id: String,
}

/// Direction of a price trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TrendDirection {
    /// Price is above base.
    Rising,
    /// Price is below base.
    Falling,
}

/// An ingredient whose price deviates notably from its base value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketTrend {
    /// Ingredient id.
    pub ingredient_id: IngredientId,
    /// Ingredient name.
    pub name: String,
    /// Signed change relative to base, in percent.
    #[ts(as = "String")]
    pub change_percent: Decimal,
    /// Rising or falling.
    pub direction: TrendDirection,
}

/// One point of a computed price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PricePoint {
    /// Game day.
    pub day: u32,
    /// Price on that day.
    #[ts(as = "String")]
    pub price: Decimal,
}

/// Receipt for a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseReceipt {
    /// Ingredient bought.
    pub ingredient_id: IngredientId,
    /// Units bought.
    pub quantity: u32,
    /// Price per unit at purchase time.
    #[ts(as = "String")]
    pub unit_price: Decimal,
    /// Coins paid (rounded up).
    pub total_cost: u64,
    /// Coins left afterwards.
    pub coins_remaining: u64,
}

/// Receipt for a completed ingredient sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SaleReceipt {
    /// Ingredient sold.
    pub ingredient_id: IngredientId,
    /// Units sold.
    pub quantity: u32,
    /// Sell price per unit.
    #[ts(as = "String")]
    pub unit_price: Decimal,
    /// Coins received (rounded down).
    pub total_revenue: u64,
    /// Coins held afterwards.
    pub coins_remaining: u64,
}

/// Receipt for a crafted dream sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DreamSaleReceipt {
    /// Dream sold.
    pub dream_id: DreamId,
    /// Dream name.
    pub name: String,
    /// Coins received.
    pub revenue: u64,
    /// Trust and lucidity gained (each).
    pub reputation_gain: i32,
}

// ---------------------------------------------------------------------------
// Crafting
// ---------------------------------------------------------------------------

/// What happened at the crafting table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CraftReport {
    /// Recipe matched, `None` for experiments.
    pub recipe_id: Option<RecipeId>,
    /// Recipe name, `None` for experiments.
    pub recipe_name: Option<String>,
    /// The dream produced, `None` when an experiment failed.
    pub dream: Option<CraftedDream>,
    /// Whether this craft discovered the recipe.
    pub new_discovery: bool,
    /// Whether the experimental path was taken.
    pub experimental: bool,
    /// Flavor text.
    pub narrative_text: String,
    /// Ingredient ids consumed, one unit each.
    pub consumed: Vec<IngredientId>,
}

// ---------------------------------------------------------------------------
// Travel
// ---------------------------------------------------------------------------

/// Summary of a completed journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TravelReport {
    /// Destination id.
    pub destination_id: CityId,
    /// Destination name.
    pub destination_name: String,
    /// Days the journey advanced the calendar.
    pub days_passed: u32,
    /// Coins paid.
    pub cost_paid: u64,
    /// Names of events that became active during the journey.
    pub events_triggered: Vec<String>,
    /// Whether the destination was unlocked by this journey.
    pub newly_unlocked: bool,
}

/// Cost of reaching a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TravelCost {
    /// Destination id.
    pub city_id: CityId,
    /// Coins charged.
    pub coins: u64,
    /// Days spent on the road.
    pub days: u32,
}

// ---------------------------------------------------------------------------
// Events and days
// ---------------------------------------------------------------------------

/// Summary of a resolved event choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChoiceReport {
    /// Event resolved.
    pub event_id: EventId,
    /// Choice taken.
    pub choice_id: ChoiceId,
    /// Coins paid.
    pub coins_paid: u64,
    /// Trust delta applied.
    pub reputation_change: i32,
    /// Ingredients granted.
    pub items_granted: BTreeMap<IngredientId, u32>,
    /// Text shown after resolution.
    pub result_text: Option<String>,
}

/// Summary of one or more day advances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DayReport {
    /// Current day after the advance.
    pub day: u32,
    /// Days advanced.
    pub days_advanced: u32,
    /// Events that expired.
    pub expired_events: Vec<EventId>,
    /// Events that triggered.
    pub triggered_events: Vec<EventId>,
}

/// A running event joined with its catalog definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveEventView {
    /// Catalog definition.
    pub event: GameEvent,
    /// City the event affects.
    pub city_id: CityId,
    /// Days before expiry.
    pub days_remaining: u32,
    /// Day the event started.
    pub started_on_day: u32,
}

// ---------------------------------------------------------------------------
// Player read models
// ---------------------------------------------------------------------------

/// Snapshot of the player's standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReputationSnapshot {
    /// Trust axis.
    pub trust: i32,
    /// Infamy axis.
    pub infamy: i32,
    /// Lucidity axis.
    pub lucidity: i32,
    /// Sum of the three axes.
    pub total: i32,
    /// Current tier (1 to 5).
    pub tier: u8,
    /// Title of the current tier.
    pub title: String,
    /// Descriptive level of the trust axis.
    pub trust_level: String,
    /// Descriptive level of the infamy axis.
    pub infamy_level: String,
    /// Descriptive level of the lucidity axis.
    pub lucidity_level: String,
}

/// One inventory stack resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Ingredient id.
    pub ingredient_id: IngredientId,
    /// Ingredient name.
    pub name: String,
    /// Ingredient rarity.
    pub rarity: Rarity,
    /// Units held.
    pub quantity: u32,
    /// Catalog base value per unit.
    #[ts(as = "String")]
    pub base_value: Decimal,
    /// Weight per unit.
    pub unit_weight: u32,
    /// Weight of the whole stack.
    pub total_weight: u32,
}
