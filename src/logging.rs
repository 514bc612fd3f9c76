//! Logging setup
//!
//! The library crates only emit `tracing` events. Applications (and the
//! integration tests) call [`init`] or [`try_init`] once to print them.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVE: &str = "herald_core=info,herald_state=info";

/// Logging setup errors
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Filter directive could not be parsed
    #[error("Invalid filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed
    #[error("Subscriber already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Build a filter from a directive string
pub fn filter_from(directive: &str) -> Result<EnvFilter, LoggingError> {
    Ok(EnvFilter::try_new(directive)?)
}

/// Build a filter from `RUST_LOG`, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.trim().is_empty() => filter_from(&directive),
        _ => filter_from(default_directive),
    }
}

/// Install a global `fmt` subscriber
pub fn try_init(default_directive: &str) -> Result<(), LoggingError> {
    let filter = env_filter(default_directive)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}

/// Install a global `fmt` subscriber with [`DEFAULT_DIRECTIVE`]
///
/// Does nothing if a subscriber is already installed.
pub fn init() {
    if let Err(e) = try_init(DEFAULT_DIRECTIVE) {
        tracing::debug!("Logging not initialized: {}", e);
    }
}
