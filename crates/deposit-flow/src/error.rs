use alloy_primitives::B256;
use serde::Serialize;
use thiserror::Error;
use vault_chains::ChainError;

/// Malformed deposit requests. Detected before any wallet interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("deposit amount must be greater than zero")]
    ZeroAmount,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid vault address: {0}")]
    InvalidVaultAddress(String),

    #[error("invalid token address: {0}")]
    InvalidTokenAddress(String),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),
}

impl From<ChainError> for ValidationError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::UnsupportedChain(id) => ValidationError::UnsupportedChain(id),
            ChainError::EncodingError(msg) => ValidationError::InvalidAmount(msg),
            ChainError::InvalidAddress(msg) => ValidationError::InvalidVaultAddress(msg),
        }
    }
}

/// Failures reported by the wallet capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("user rejected the request: {0}")]
    UserRejected(String),

    #[error("wallet cannot switch to chain {0}")]
    SwitchUnsupported(u64),

    #[error("simulation reverted: {0}")]
    SimulationReverted(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("transaction {0} reverted")]
    Reverted(B256),

    #[error("timed out waiting for receipt")]
    Timeout,
}

/// Why a submitted transaction did not reach a confirmed receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchFailure {
    #[error("transaction {0} reverted")]
    Reverted(B256),

    #[error("transaction {0} was cancelled in the wallet")]
    Cancelled(B256),

    #[error("transaction {hash} was not confirmed within {budget_secs}s")]
    Timeout { hash: B256, budget_secs: u64 },

    #[error("provider error while waiting for {hash}: {message}")]
    Provider { hash: B256, message: String },
}

/// Coarse error category exposed on the status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotConnected,
    UserRejected,
    ChainMismatch,
    Provider,
    Reverted,
    Timeout,
    Cancelled,
}

/// Everything that can end a deposit flow in the `error` status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("invalid deposit request: {0}")]
    Validation(#[from] ValidationError),

    #[error("wallet not connected")]
    NotConnected,

    #[error("user rejected the request: {0}")]
    UserRejected(String),

    #[error("wallet cannot switch to chain {0}")]
    SwitchUnsupported(u64),

    #[error("active chain changed to {active} while the deposit targets {expected}; restart the deposit")]
    ChainMismatch { expected: u64, active: u64 },

    #[error("transaction simulation reverted: {0}")]
    SimulationReverted(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("transaction {0} reverted")]
    Reverted(B256),

    #[error(
        "transaction {hash} was not confirmed within {budget_secs}s; it may still confirm later, check the explorer before retrying"
    )]
    Timeout { hash: B256, budget_secs: u64 },

    #[error("transaction {0} was cancelled in the wallet")]
    Cancelled(B256),
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::Validation(_) => ErrorKind::Validation,
            FlowError::NotConnected => ErrorKind::NotConnected,
            FlowError::UserRejected(_) => ErrorKind::UserRejected,
            FlowError::ChainMismatch { .. } => ErrorKind::ChainMismatch,
            FlowError::SwitchUnsupported(_)
            | FlowError::SimulationReverted(_)
            | FlowError::Provider(_) => ErrorKind::Provider,
            FlowError::Reverted(_) => ErrorKind::Reverted,
            FlowError::Timeout { .. } => ErrorKind::Timeout,
            FlowError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Hash of the transaction this error concerns, if any.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            FlowError::Reverted(hash)
            | FlowError::Cancelled(hash)
            | FlowError::Timeout { hash, .. } => Some(*hash),
            _ => None,
        }
    }
}

impl From<GatewayError> for FlowError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::UserRejected(msg) => FlowError::UserRejected(msg),
            GatewayError::SwitchUnsupported(id) => FlowError::SwitchUnsupported(id),
            GatewayError::SimulationReverted(msg) => FlowError::SimulationReverted(msg),
            GatewayError::Provider(msg) => FlowError::Provider(msg),
            GatewayError::Reverted(hash) => FlowError::Reverted(hash),
            GatewayError::Timeout => FlowError::Provider("wallet request timed out".into()),
        }
    }
}

impl From<WatchFailure> for FlowError {
    fn from(e: WatchFailure) -> Self {
        match e {
            WatchFailure::Reverted(hash) => FlowError::Reverted(hash),
            WatchFailure::Cancelled(hash) => FlowError::Cancelled(hash),
            WatchFailure::Timeout { hash, budget_secs } => FlowError::Timeout { hash, budget_secs },
            WatchFailure::Provider { message, .. } => FlowError::Provider(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation_error() {
        let err = FlowError::from(ValidationError::ZeroAmount);
        assert_eq!(
            err.to_string(),
            "invalid deposit request: deposit amount must be greater than zero"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn chain_error_maps_to_validation() {
        let err = ValidationError::from(ChainError::UnsupportedChain(999));
        assert_eq!(err, ValidationError::UnsupportedChain(999));
    }

    #[test]
    fn display_chain_mismatch() {
        let err = FlowError::ChainMismatch {
            expected: 8453,
            active: 1,
        };
        assert!(err.to_string().contains("changed to 1"));
        assert!(err.to_string().contains("targets 8453"));
    }

    #[test]
    fn timeout_message_says_it_may_still_confirm() {
        let err = FlowError::from(WatchFailure::Timeout {
            hash: B256::repeat_byte(1),
            budget_secs: 300,
        });
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("within 300s"));
        assert!(err.to_string().contains("may still confirm later"));
        assert_eq!(err.tx_hash(), Some(B256::repeat_byte(1)));
    }

    #[test]
    fn gateway_rejection_keeps_message() {
        let err = FlowError::from(GatewayError::UserRejected("denied in wallet".into()));
        assert_eq!(err.kind(), ErrorKind::UserRejected);
        assert_eq!(err.to_string(), "user rejected the request: denied in wallet");
    }

    #[test]
    fn provider_class_errors() {
        for err in [
            FlowError::from(GatewayError::SimulationReverted("ERC20: insufficient allowance".into())),
            FlowError::from(GatewayError::Provider("503".into())),
            FlowError::from(GatewayError::SwitchUnsupported(250)),
        ] {
            assert_eq!(err.kind(), ErrorKind::Provider);
        }
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ChainMismatch).unwrap();
        assert_eq!(json, "\"chain_mismatch\"");
    }
}
