//! Configuration loading and typed config structures for the Dream Alchemist
//! engine.
//!
//! The canonical configuration lives in `alchemist-config.yaml` at the
//! project root. Every field has a default equal to the game's tuning
//! constants, so an empty or partial file is valid.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use alchemist_types::Rarity;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `alchemist-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Starting funds, market pricing, and trading parameters.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Event roll parameters.
    #[serde(default)]
    pub events: EventsConfig,

    /// Crafting probabilities and bonuses.
    #[serde(default)]
    pub crafting: CraftingConfig,

    /// Reputation bounds and tier thresholds.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Save and catalog locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Automated session parameters for the CLI.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for storage paths:
    /// - `ALCHEMIST_SAVE_DIR` overrides `storage.save_dir`
    /// - `ALCHEMIST_CATALOG_DIR` overrides `storage.catalog_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Rarity tables
// ---------------------------------------------------------------------------

/// A value per rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RarityTable<T> {
    /// Value for [`Rarity::Common`].
    pub common: T,
    /// Value for [`Rarity::Uncommon`].
    pub uncommon: T,
    /// Value for [`Rarity::Rare`].
    pub rare: T,
    /// Value for [`Rarity::Epic`].
    pub epic: T,
    /// Value for [`Rarity::Legendary`].
    pub legendary: T,
}

impl<T: Copy> RarityTable<T> {
    /// Look up the value for a rarity.
    pub const fn get(&self, rarity: Rarity) -> T {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Economy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Coins a new player starts with.
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,

    /// Carrying capacity of a new player.
    #[serde(default = "default_starting_capacity")]
    pub starting_capacity: u32,

    /// City a new player starts in.
    #[serde(default = "default_starting_city")]
    pub starting_city: String,

    /// Lowest price as a multiple of base value.
    #[serde(default = "default_min_price_multiplier")]
    pub min_price_multiplier: Decimal,

    /// Highest price as a multiple of base value.
    #[serde(default = "default_max_price_multiplier")]
    pub max_price_multiplier: Decimal,

    /// Fraction of the current price paid when the player sells.
    #[serde(default = "default_sell_ratio")]
    pub sell_ratio: Decimal,

    /// Price multiplier per rarity.
    #[serde(default = "default_rarity_modifiers")]
    pub rarity_modifiers: RarityTable<Decimal>,

    /// Market stock per rarity.
    #[serde(default = "default_available_quantities")]
    pub available_quantities: RarityTable<u32>,

    /// Absolute change from base, in percent, above which a price trends.
    #[serde(default = "default_trend_threshold_percent")]
    pub trend_threshold_percent: Decimal,

    /// Maximum number of trends reported per city.
    #[serde(default = "default_max_trends")]
    pub max_trends: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_coins: default_starting_coins(),
            starting_capacity: default_starting_capacity(),
            starting_city: default_starting_city(),
            min_price_multiplier: default_min_price_multiplier(),
            max_price_multiplier: default_max_price_multiplier(),
            sell_ratio: default_sell_ratio(),
            rarity_modifiers: default_rarity_modifiers(),
            available_quantities: default_available_quantities(),
            trend_threshold_percent: default_trend_threshold_percent(),
            max_trends: default_max_trends(),
        }
    }
}

/// Event roll parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventsConfig {
    /// Daily chance that an event roll is attempted.
    #[serde(default = "default_base_event_probability")]
    pub base_event_probability: f64,

    /// Maximum number of events active at once.
    #[serde(default = "default_max_simultaneous_events")]
    pub max_simultaneous_events: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            base_event_probability: default_base_event_probability(),
            max_simultaneous_events: default_max_simultaneous_events(),
        }
    }
}

/// Crafting parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CraftingConfig {
    /// Experimental success chance before the lucidity bonus.
    #[serde(default = "default_experimental_base_chance")]
    pub experimental_base_chance: f64,

    /// Lucidity is divided by this before being added to the chance.
    #[serde(default = "default_lucidity_divisor")]
    pub lucidity_divisor: f64,

    /// Value multiplier for experimental dreams.
    #[serde(default = "default_experimental_value_multiplier")]
    pub experimental_value_multiplier: Decimal,

    /// Lucidity granted when a recipe is discovered.
    #[serde(default = "default_discovery_lucidity_bonus")]
    pub discovery_lucidity_bonus: i32,

    /// Lucidity granted for a successful experiment.
    #[serde(default = "default_experimental_lucidity_bonus")]
    pub experimental_lucidity_bonus: i32,
}

impl Default for CraftingConfig {
    fn default() -> Self {
        Self {
            experimental_base_chance: default_experimental_base_chance(),
            lucidity_divisor: default_lucidity_divisor(),
            experimental_value_multiplier: default_experimental_value_multiplier(),
            discovery_lucidity_bonus: default_discovery_lucidity_bonus(),
            experimental_lucidity_bonus: default_experimental_lucidity_bonus(),
        }
    }
}

/// Reputation and tier parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressionConfig {
    /// Lower bound of every reputation axis.
    #[serde(default = "default_reputation_min")]
    pub reputation_min: i32,

    /// Upper bound of every reputation axis.
    #[serde(default = "default_reputation_max")]
    pub reputation_max: i32,

    /// Summed-reputation thresholds for tiers 2 through 5, ascending.
    #[serde(default = "default_tier_thresholds")]
    pub tier_thresholds: Vec<i32>,

    /// Capacity gained per tier-up.
    #[serde(default = "default_capacity_per_tier")]
    pub capacity_per_tier: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            reputation_min: default_reputation_min(),
            reputation_max: default_reputation_max(),
            tier_thresholds: default_tier_thresholds(),
            capacity_per_tier: default_capacity_per_tier(),
        }
    }
}

/// Save and catalog locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `player.json`.
    #[serde(default = "default_save_dir")]
    pub save_dir: String,

    /// Directory holding the YAML catalog seed files.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,
}

impl StorageConfig {
    /// Override storage paths with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ALCHEMIST_SAVE_DIR") {
            self.save_dir = val;
        }
        if let Ok(val) = std::env::var("ALCHEMIST_CATALOG_DIR") {
            self.catalog_dir = val;
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            catalog_dir: default_catalog_dir(),
        }
    }
}

/// Automated session parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Seed for event rolls and experiments; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of days the automated trader plays.
    #[serde(default = "default_autoplay_days")]
    pub autoplay_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            autoplay_days: default_autoplay_days(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_starting_coins() -> u64 {
    5_000
}

const fn default_starting_capacity() -> u32 {
    100
}

fn default_starting_city() -> String {
    "somnia_terminal".to_owned()
}

const fn default_min_price_multiplier() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 1)
}

const fn default_max_price_multiplier() -> Decimal {
    Decimal::from_parts(30, 0, 0, false, 1)
}

const fn default_sell_ratio() -> Decimal {
    Decimal::from_parts(8, 0, 0, false, 1)
}

const fn default_rarity_modifiers() -> RarityTable<Decimal> {
    RarityTable {
        common: Decimal::from_parts(10, 0, 0, false, 1),
        uncommon: Decimal::from_parts(15, 0, 0, false, 1),
        rare: Decimal::from_parts(25, 0, 0, false, 1),
        epic: Decimal::from_parts(40, 0, 0, false, 1),
        legendary: Decimal::from_parts(70, 0, 0, false, 1),
    }
}

const fn default_available_quantities() -> RarityTable<u32> {
    RarityTable {
        common: 50,
        uncommon: 30,
        rare: 15,
        epic: 8,
        legendary: 3,
    }
}

const fn default_trend_threshold_percent() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 0)
}

const fn default_max_trends() -> usize {
    5
}

const fn default_base_event_probability() -> f64 {
    0.15
}

const fn default_max_simultaneous_events() -> usize {
    3
}

const fn default_experimental_base_chance() -> f64 {
    0.20
}

const fn default_lucidity_divisor() -> f64 {
    1000.0
}

const fn default_experimental_value_multiplier() -> Decimal {
    Decimal::from_parts(12, 0, 0, false, 1)
}

const fn default_discovery_lucidity_bonus() -> i32 {
    5
}

const fn default_experimental_lucidity_bonus() -> i32 {
    2
}

const fn default_reputation_min() -> i32 {
    -100
}

const fn default_reputation_max() -> i32 {
    100
}

fn default_tier_thresholds() -> Vec<i32> {
    vec![50, 120, 200, 300]
}

const fn default_capacity_per_tier() -> u32 {
    50
}

fn default_save_dir() -> String {
    "saves".to_owned()
}

fn default_catalog_dir() -> String {
    "seed".to_owned()
}

const fn default_autoplay_days() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_owned()
}
