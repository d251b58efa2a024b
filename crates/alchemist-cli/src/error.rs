//! Error types for the CLI binary.
//!
//! [`CliError`] is the top-level error type that wraps every failure mode
//! during startup and the automated session.

/// Top-level error for the CLI binary.
///
/// Each variant wraps a specific subsystem error, providing a single error
/// type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: alchemist_engine::ConfigError,
    },

    /// Persisting the session failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: alchemist_store::StoreError,
    },
}
