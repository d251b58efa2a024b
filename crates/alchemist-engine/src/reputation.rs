//! Reputation axes and tier progression.
//!
//! The player has three independent reputation axes (trust, infamy,
//! lucidity). All changes pass through [`update_reputation`], which clamps
//! each axis to the configured bounds and then recomputes the tier from the
//! summed axes.
//!
//! # Invariants
//!
//! - Every axis stays within `[reputation_min, reputation_max]`.
//! - Tier never decreases. Each tier gained adds `capacity_per_tier` to the
//!   player's maximum carrying weight and updates the title.

use serde::{Deserialize, Serialize};
use tracing::info;

use alchemist_types::ReputationSnapshot;

use crate::config::ProgressionConfig;
use crate::player::PlayerState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest tier.
pub const MIN_TIER: u8 = 1;

/// Highest tier.
pub const MAX_TIER: u8 = 5;

/// Titles for tiers 1 through 5.
const TIER_TITLES: [&str; 5] = [
    "Novice Peddler",
    "Dream Artisan",
    "Dream Broker",
    "Dream Cartel Leader",
    "Lucid Architect",
];

// ---------------------------------------------------------------------------
// Reputation
// ---------------------------------------------------------------------------

/// The three reputation axes.
///
/// Fields are private; use [`update_reputation`] to change them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
    trust: i32,
    infamy: i32,
    lucidity: i32,
}

impl Reputation {
    /// Trust axis.
    pub const fn trust(&self) -> i32 {
        self.trust
    }

    /// Infamy axis.
    pub const fn infamy(&self) -> i32 {
        self.infamy
    }

    /// Lucidity axis.
    pub const fn lucidity(&self) -> i32 {
        self.lucidity
    }

    /// Sum of the three axes.
    pub const fn total(&self) -> i32 {
        self.trust
            .saturating_add(self.infamy)
            .saturating_add(self.lucidity)
    }

    /// Return a copy with the delta added and every axis clamped.
    pub(crate) fn apply(self, delta: ReputationDelta, min: i32, max: i32) -> Self {
        Self {
            trust: clamp_axis(self.trust.saturating_add(delta.trust), min, max),
            infamy: clamp_axis(self.infamy.saturating_add(delta.infamy), min, max),
            lucidity: clamp_axis(self.lucidity.saturating_add(delta.lucidity), min, max),
        }
    }
}

/// A change to the reputation axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReputationDelta {
    /// Trust change.
    pub trust: i32,
    /// Infamy change.
    pub infamy: i32,
    /// Lucidity change.
    pub lucidity: i32,
}

impl ReputationDelta {
    /// A delta touching all three axes.
    pub const fn new(trust: i32, infamy: i32, lucidity: i32) -> Self {
        Self {
            trust,
            infamy,
            lucidity,
        }
    }

    /// A trust-only delta.
    pub const fn trust(amount: i32) -> Self {
        Self::new(amount, 0, 0)
    }

    /// A lucidity-only delta.
    pub const fn lucidity(amount: i32) -> Self {
        Self::new(0, 0, amount)
    }

    /// Whether the delta changes nothing.
    pub const fn is_zero(&self) -> bool {
        self.trust == 0 && self.infamy == 0 && self.lucidity == 0
    }
}

/// Tier before and after a reputation update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierChange {
    /// Tier before the update.
    pub previous: u8,
    /// Tier after the update.
    pub current: u8,
}

impl TierChange {
    /// Whether the update raised the tier.
    pub const fn tiered_up(&self) -> bool {
        self.current > self.previous
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Apply a reputation delta to the player, clamp it, and check for tier-ups.
pub fn update_reputation(
    state: &mut PlayerState,
    delta: ReputationDelta,
    config: &ProgressionConfig,
) -> TierChange {
    state.reputation = state
        .reputation
        .apply(delta, config.reputation_min, config.reputation_max);
    check_tier_progression(state, config)
}

/// Raise the player's tier if the summed reputation crosses a threshold.
///
/// Tier never regresses. A tier-up grants `capacity_per_tier` once, even
/// when the update crosses several thresholds.
pub fn check_tier_progression(state: &mut PlayerState, config: &ProgressionConfig) -> TierChange {
    let previous = state.tier;
    let earned = tier_for_total(state.reputation.total(), &config.tier_thresholds);
    if earned <= previous {
        return TierChange {
            previous,
            current: previous,
        };
    }

    state.max_weight = state.max_weight.saturating_add(config.capacity_per_tier);
    state.tier = earned;
    tier_title(earned).clone_into(&mut state.title);
    state.player_name.clone_from(&state.title);

    info!(
        previous_tier = previous,
        tier = earned,
        title = %state.title,
        max_weight = state.max_weight,
        "tier up"
    );

    TierChange {
        previous,
        current: earned,
    }
}

/// Compute the tier for a summed reputation.
///
/// Tier 1 lies below the first threshold; each threshold reached adds one
/// tier, up to [`MAX_TIER`].
pub fn tier_for_total(total: i32, thresholds: &[i32]) -> u8 {
    let reached = thresholds.iter().filter(|t| total >= **t).count();
    let reached = u8::try_from(reached).unwrap_or(u8::MAX);
    MIN_TIER.saturating_add(reached).min(MAX_TIER)
}

/// Title for a tier. Out-of-range tiers clamp to the nearest title.
pub fn tier_title(tier: u8) -> &'static str {
    let index = usize::from(tier.clamp(MIN_TIER, MAX_TIER).saturating_sub(1));
    TIER_TITLES.get(index).copied().unwrap_or("Novice Peddler")
}

/// Build the reputation snapshot for a player.
pub fn snapshot(state: &PlayerState) -> ReputationSnapshot {
    let rep = state.reputation;
    ReputationSnapshot {
        trust: rep.trust(),
        infamy: rep.infamy(),
        lucidity: rep.lucidity(),
        total: rep.total(),
        tier: state.tier,
        title: state.title.clone(),
        trust_level: trust_level(rep.trust()).to_owned(),
        infamy_level: infamy_level(rep.infamy()).to_owned(),
        lucidity_level: lucidity_level(rep.lucidity()).to_owned(),
    }
}

/// Descriptive word for a trust value.
pub const fn trust_level(value: i32) -> &'static str {
    match value {
        75.. => "Revered",
        40..=74 => "Trusted",
        10..=39 => "Reliable",
        -9..=9 => "Unknown",
        -39..=-10 => "Suspicious",
        _ => "Distrusted",
    }
}

/// Descriptive word for an infamy value.
pub const fn infamy_level(value: i32) -> &'static str {
    match value {
        75.. => "Legendary",
        40..=74 => "Notorious",
        10..=39 => "Curious",
        -9..=9 => "Unknown",
        _ => "Respectable",
    }
}

/// Descriptive word for a lucidity value.
pub const fn lucidity_level(value: i32) -> &'static str {
    match value {
        75.. => "Enlightened",
        40..=74 => "Lucid",
        10..=39 => "Aware",
        -9..=9 => "Drowsy",
        _ => "Lost",
    }
}

const fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
