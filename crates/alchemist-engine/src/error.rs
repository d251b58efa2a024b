//! Error types for the alchemist-engine crate.
//!
//! Engine functions return [`GameError`] through `Result` and propagate with
//! `?`. The session converts every error into a [`Rejection`] so callers only
//! ever see a refused operation, never a Rust error.

use alchemist_types::{
    ChoiceId, CityId, DreamId, EventId, IngredientId, RecipeId, Rejection, RejectionReason,
};

/// Errors that can occur during game operations.
///
/// Every variant leaves the player state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Crafting was requested with too few or too many ingredients.
    #[error("crafting needs 2 or 3 different ingredients, got {count}")]
    InvalidIngredientCount {
        /// Number of distinct ingredient ids supplied.
        count: usize,
    },

    /// A quantity of zero was requested.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The event is already active.
    #[error("event {0} is already active")]
    EventAlreadyActive(EventId),

    /// Too many events are already active.
    #[error("no more than {cap} events can be active at once")]
    EventCapReached {
        /// The configured cap.
        cap: usize,
    },

    /// The player cannot afford the operation.
    #[error("insufficient coins: need {required}, have {available}")]
    InsufficientCoins {
        /// Coins the operation costs.
        required: u64,
        /// Coins the player holds.
        available: u64,
    },

    /// The player holds fewer units than requested.
    #[error("insufficient {ingredient_id}: wanted {requested} but only have {available}")]
    InsufficientQuantity {
        /// The ingredient being removed.
        ingredient_id: IngredientId,
        /// Units requested.
        requested: u32,
        /// Units held.
        available: u32,
    },

    /// One or more crafting ingredients are not held.
    #[error("missing ingredients: {}", join_ids(.missing))]
    MissingIngredients {
        /// Ingredient ids the player does not hold.
        missing: Vec<IngredientId>,
    },

    /// The addition would exceed the carrying capacity.
    #[error("not enough carrying capacity: need {required}, have {available} free")]
    CapacityExceeded {
        /// Weight the addition needs.
        required: u32,
        /// Free capacity.
        available: u32,
    },

    /// Ingredient id absent from the catalog.
    #[error("ingredient not found: {0}")]
    UnknownIngredient(IngredientId),

    /// Recipe id absent from the catalog.
    #[error("recipe not found: {0}")]
    UnknownRecipe(RecipeId),

    /// City id absent from the catalog.
    #[error("city not found: {0}")]
    UnknownCity(CityId),

    /// Event id absent from the catalog or not currently active.
    #[error("event not found: {0}")]
    UnknownEvent(EventId),

    /// Choice id not offered by the event.
    #[error("choice {choice_id} not found for event {event_id}")]
    UnknownChoice {
        /// The event being resolved.
        event_id: EventId,
        /// The requested choice.
        choice_id: ChoiceId,
    },

    /// Crafted dream absent from the player's stash.
    #[error("crafted dream not found: {0}")]
    UnknownDream(DreamId),

    /// The player is already in the destination city.
    #[error("already in {0}")]
    AlreadyInCity(CityId),

    /// Summed reputation is below the destination's requirement.
    #[error("reputation too low: {city_id} requires {required}, you have {current}")]
    ReputationTooLow {
        /// The destination.
        city_id: CityId,
        /// Required summed reputation.
        required: i32,
        /// The player's summed reputation.
        current: i32,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl GameError {
    /// Build an overflow error with the given context.
    pub fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }

    /// Return the rejection reason this error maps onto.
    pub const fn reason(&self) -> RejectionReason {
        match self {
            Self::InvalidIngredientCount { .. } => RejectionReason::InvalidIngredientCount,
            Self::InvalidQuantity => RejectionReason::InvalidQuantity,
            Self::EventAlreadyActive(_) => RejectionReason::EventAlreadyActive,
            Self::EventCapReached { .. } => RejectionReason::EventCapReached,
            Self::InsufficientCoins { .. } => RejectionReason::InsufficientCoins,
            Self::InsufficientQuantity { .. } => RejectionReason::InsufficientQuantity,
            Self::MissingIngredients { .. } => RejectionReason::MissingIngredients,
            Self::CapacityExceeded { .. } => RejectionReason::CapacityExceeded,
            Self::UnknownIngredient(_) => RejectionReason::UnknownIngredient,
            Self::UnknownRecipe(_) => RejectionReason::UnknownRecipe,
            Self::UnknownCity(_) => RejectionReason::UnknownCity,
            Self::UnknownEvent(_) => RejectionReason::UnknownEvent,
            Self::UnknownChoice { .. } => RejectionReason::UnknownChoice,
            Self::UnknownDream(_) => RejectionReason::UnknownDream,
            Self::AlreadyInCity(_) => RejectionReason::AlreadyInCity,
            Self::ReputationTooLow { .. } => RejectionReason::ReputationTooLow,
            Self::ArithmeticOverflow { .. } => RejectionReason::ValueOutOfRange,
        }
    }

    /// Convert into the rejection surfaced to callers.
    pub fn to_rejection(&self) -> Rejection {
        Rejection::new(self.reason(), self.to_string())
    }
}

fn join_ids(ids: &[IngredientId]) -> String {
    ids.iter()
        .map(IngredientId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use alchemist_types::ErrorCategory;

    use super::*;

    #[test]
    fn reputation_message_names_the_shortfall() {
        let err = GameError::ReputationTooLow {
            city_id: CityId::from("lucid_spire"),
            required: 100,
            current: 40,
        };
        let rejection = err.to_rejection();
        assert_eq!(rejection.reason, RejectionReason::ReputationTooLow);
        assert_eq!(rejection.category, ErrorCategory::Ineligible);
        assert!(rejection.message.contains("reputation too low"));
        assert!(rejection.message.contains("100"));
        assert!(rejection.message.contains("40"));
    }

    #[test]
    fn funds_and_reputation_are_distinguished() {
        let funds = GameError::InsufficientCoins {
            required: 500,
            available: 10,
        };
        assert_eq!(funds.reason(), RejectionReason::InsufficientCoins);
        assert_eq!(
            funds.reason().category(),
            ErrorCategory::InsufficientResource
        );
    }

    #[test]
    fn missing_ingredients_are_listed() {
        let err = GameError::MissingIngredients {
            missing: vec![IngredientId::from("ing1"), IngredientId::from("ing3")],
        };
        assert_eq!(err.to_string(), "missing ingredients: ing1, ing3");
    }
}
