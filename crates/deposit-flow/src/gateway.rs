//! The wallet capability the orchestrator runs against.
//!
//! Implementations wrap whatever actually holds the user's keys (a browser
//! wallet bridge, a mobile signer, a test double). The orchestrator never
//! signs or talks to an RPC node itself.

use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Serialize;
use vault_chains::CallKind;

use crate::error::GatewayError;

/// A state-changing contract call to be signed and broadcast by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    pub kind: CallKind,
    pub chain_id: u64,
    pub to: Address,
    /// Selector followed by ABI-encoded arguments.
    pub data: Vec<u8>,
    /// Native currency attached to the call; non-zero only for wraps.
    pub value: U256,
}

impl ContractCall {
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).map(|s| [s[0], s[1], s[2], s[3]])
    }
}

/// A confirmed transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub confirmations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementReason {
    /// Same call re-broadcast with a different payload or nonce handling.
    Replaced,
    /// Same call re-broadcast with a higher fee (speed-up).
    Repriced,
    /// Superseded by a no-op transaction.
    Cancelled,
}

/// The pending transaction was superseded at the same nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub reason: ReplacementReason,
    pub previous_hash: B256,
    pub new_hash: B256,
}

/// Result of a single receipt wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Confirmed(TxReceipt),
    Replaced(Replacement),
    /// The gateway's own wait budget ran out.
    TimedOut,
}

#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Chain the wallet is currently pointed at. Shared with anything else in
    /// the session, so it can change between calls.
    async fn active_chain(&self) -> Result<u64, GatewayError>;

    /// Connected account, if any.
    async fn account(&self) -> Result<Option<Address>, GatewayError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), GatewayError>;

    /// Signs and broadcasts `call`, returning the transaction hash.
    async fn write_contract(&self, call: &ContractCall) -> Result<B256, GatewayError>;

    /// Waits for `tx_hash` to reach `confirmations`, or for the first
    /// replacement of it, whichever comes first.
    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<WaitOutcome, GatewayError>;

    /// ERC-20 `decimals()` of `token`. Used for display only.
    async fn token_decimals(&self, chain_id: u64, token: Address) -> Result<u8, GatewayError>;
}
