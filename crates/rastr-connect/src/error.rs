//! Error types for rastr-connect

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ConfigError`]
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A single strategy that could not produce a handle.
///
/// Recorded by the resolver and carried on to the next strategy; it only
/// reaches the caller as part of an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{label}: {message}")]
pub struct StrategyFailure {
    pub label: String,
    pub message: String,
}

impl StrategyFailure {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// Why a resolver call ended without a handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The host cannot provide automation at all; no strategy was attempted.
    #[error("Platform unsupported: {0}")]
    PlatformUnsupported(String),

    /// Every strategy was attempted and failed.
    #[error("All connection strategies failed: {}", FailureList(.0))]
    AllStrategiesExhausted(Vec<StrategyFailure>),
}

impl ResolveError {
    /// Failures recorded before giving up (empty for an unsupported platform).
    pub fn failures(&self) -> &[StrategyFailure] {
        match self {
            ResolveError::PlatformUnsupported(_) => &[],
            ResolveError::AllStrategiesExhausted(failures) => failures,
        }
    }
}

struct FailureList<'a>(&'a [StrategyFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Errors building a resolver or loading its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At least one connection strategy is required")]
    NoStrategies,

    #[error("Invalid strategy #{index}: {reason}")]
    InvalidStrategy { index: usize, reason: String },

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
