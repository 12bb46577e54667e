use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confirmations required before a step counts as done.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Wait budget per submitted transaction, measured from submission.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Budget for the display-only `decimals()` read before falling back to the
/// chain's native decimals.
pub const DEFAULT_DECIMALS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid flow config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("confirmations must be at least 1")]
    ZeroConfirmations,

    #[error("confirmation timeout must be non-zero")]
    ZeroTimeout,

    #[error("decimals timeout must be non-zero")]
    ZeroDecimalsTimeout,
}

/// Tunables for a deposit flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub confirmations: u64,
    pub confirmation_timeout_ms: u64,
    pub decimals_timeout_ms: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            confirmation_timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT.as_millis() as u64,
            decimals_timeout_ms: DEFAULT_DECIMALS_TIMEOUT.as_millis() as u64,
        }
    }
}

impl FlowConfig {
    /// Parses a JSON config, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FlowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmations == 0 {
            return Err(ConfigError::ZeroConfirmations);
        }
        if self.confirmation_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.decimals_timeout_ms == 0 {
            return Err(ConfigError::ZeroDecimalsTimeout);
        }
        Ok(())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn decimals_timeout(&self) -> Duration {
        Duration::from_millis(self.decimals_timeout_ms)
    }
}
