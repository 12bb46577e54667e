//! Client-side orchestration of vault deposits through a connected wallet.
//!
//! A [`DepositOrchestrator`] drives one deposit from request to terminal
//! status: it reconciles the wallet's active chain, wraps native currency
//! where the vault wants the wrapped token, approves the vault, submits the
//! deposit and waits for confirmation through a [`TransactionWatcher`].
//! Every blockchain interaction goes through the injected [`WalletGateway`].

pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod request;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod watcher;

pub use config::{ConfigError, FlowConfig};
pub use error::{ErrorKind, FlowError, GatewayError, ValidationError, WatchFailure};
pub use gateway::{
    ContractCall, Replacement, ReplacementReason, TxReceipt, WaitOutcome, WalletGateway,
};
pub use orchestrator::DepositOrchestrator;
pub use request::{DepositParams, DepositRequest};
pub use state::{DepositFlowState, FlowEvent, FlowStatus, TokenKind};
pub use watcher::{ConfirmedTx, TransactionWatcher};
