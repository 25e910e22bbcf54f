//! Resolver configuration, loadable from JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::inspect::DEFAULT_PROBE_MEMBERS;
use crate::resolver::ConnectionResolver;
use crate::strategy::{default_strategies, ConnectionStrategy};

/// Configuration for connecting to RastrWin.
///
/// ```json
/// {
///   "strategies": [
///     { "identifier": "Astra.Rastr", "method": "simple-dispatch", "label": "ProgID('Astra.Rastr')" }
///   ],
///   "timeout_ms": 5000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Strategies in priority order.
    pub strategies: Vec<ConnectionStrategy>,

    /// Deadline for a whole connect run. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,

    /// Members to look for when inspecting a connected object.
    pub probe_members: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            timeout_ms: None,
            probe_members: DEFAULT_PROBE_MEMBERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Check the strategy list: non-empty, no blank identifiers or labels.
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        for (index, strategy) in self.strategies.iter().enumerate() {
            if strategy.identifier().trim().is_empty() {
                return Err(ConfigError::InvalidStrategy {
                    index,
                    reason: "identifier is empty".to_string(),
                });
            }
            if strategy.label().trim().is_empty() {
                return Err(ConfigError::InvalidStrategy {
                    index,
                    reason: "label is empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn resolver(&self) -> Result<ConnectionResolver> {
        self.validate()?;
        ConnectionResolver::new(self.strategies.clone())
    }
}
