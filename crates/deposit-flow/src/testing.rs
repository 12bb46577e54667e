//! In-memory [`WalletGateway`] with scripted behaviour.
//!
//! Every write is accepted and confirmed by default. Tests script rejections,
//! replacements, hangs and out-of-band chain switches, then inspect the
//! recorded [`GatewayEvent`]s to check ordering.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy_primitives::{address, Address, B256};
use async_trait::async_trait;
use vault_chains::CallKind;

use crate::error::GatewayError;
use crate::gateway::{
    ContractCall, Replacement, ReplacementReason, TxReceipt, WaitOutcome, WalletGateway,
};

/// Account reported as connected unless [`ScriptedGateway::disconnect`] is called.
pub const TEST_ACCOUNT: Address = address!("00000000000000000000000000000000000a11ce");

/// Deterministic transaction hash. The n-th accepted write gets `mock_hash(n)`,
/// counting from 1.
pub fn mock_hash(n: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    B256::from(bytes)
}

/// What a receipt wait does.
#[derive(Debug, Clone)]
pub enum ScriptedWait {
    Confirm,
    ConfirmAfter(Duration),
    Replace {
        reason: ReplacementReason,
        new_hash: B256,
    },
    ReplaceAfter {
        delay: Duration,
        reason: ReplacementReason,
        new_hash: B256,
    },
    /// Never settles.
    Hang,
    Fail(GatewayError),
    /// The gateway gives up on its own.
    GatewayTimeout,
}

/// Observable gateway interactions, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    SwitchChain(u64),
    Write { kind: CallKind, hash: Option<B256> },
    WaitStarted(B256),
    Receipt(B256),
}

struct Inner {
    active_chain: u64,
    account: Option<Address>,
    decimals: Option<u8>,
    decimals_hang: bool,
    switch_error: Option<GatewayError>,
    write_failures: HashMap<CallKind, GatewayError>,
    kind_waits: HashMap<CallKind, ScriptedWait>,
    hash_waits: HashMap<B256, ScriptedWait>,
    chain_after: HashMap<CallKind, u64>,
    hash_kinds: HashMap<B256, CallKind>,
    writes: Vec<ContractCall>,
    events: Vec<GatewayEvent>,
    accepted_writes: u64,
    next_block: u64,
}

pub struct ScriptedGateway {
    inner: Mutex<Inner>,
}

impl ScriptedGateway {
    /// A connected wallet on `active_chain` whose tokens report 18 decimals.
    pub fn new(active_chain: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                active_chain,
                account: Some(TEST_ACCOUNT),
                decimals: Some(18),
                decimals_hang: false,
                switch_error: None,
                write_failures: HashMap::new(),
                kind_waits: HashMap::new(),
                hash_waits: HashMap::new(),
                chain_after: HashMap::new(),
                hash_kinds: HashMap::new(),
                writes: Vec::new(),
                events: Vec::new(),
                accepted_writes: 0,
                next_block: 1_000,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn disconnect(&self) {
        self.inner().account = None;
    }

    /// Simulates a chain switch made outside the flow.
    pub fn set_active_chain(&self, chain_id: u64) {
        self.inner().active_chain = chain_id;
    }

    /// `None` makes `decimals()` reads fail.
    pub fn set_decimals(&self, decimals: Option<u8>) {
        self.inner().decimals = decimals;
    }

    /// Makes `decimals()` reads never settle.
    pub fn hang_decimals(&self) {
        self.inner().decimals_hang = true;
    }

    pub fn reject_switch(&self, error: GatewayError) {
        self.inner().switch_error = Some(error);
    }

    pub fn fail_write(&self, kind: CallKind, error: GatewayError) {
        self.inner().write_failures.insert(kind, error);
    }

    /// Scripts the wait on the hash produced by the next `kind` write.
    pub fn script_wait(&self, kind: CallKind, wait: ScriptedWait) {
        self.inner().kind_waits.insert(kind, wait);
    }

    pub fn script_hash_wait(&self, hash: B256, wait: ScriptedWait) {
        self.inner().hash_waits.insert(hash, wait);
    }

    /// Moves the wallet to `chain_id` right after the `kind` step confirms.
    pub fn switch_chain_after(&self, kind: CallKind, chain_id: u64) {
        self.inner().chain_after.insert(kind, chain_id);
    }

    pub fn events(&self) -> Vec<GatewayEvent> {
        self.inner().events.clone()
    }

    /// Every write attempted, accepted or not.
    pub fn writes(&self) -> Vec<ContractCall> {
        self.inner().writes.clone()
    }

    pub fn write_kinds(&self) -> Vec<CallKind> {
        self.inner().writes.iter().map(|w| w.kind).collect()
    }

    pub fn switch_requests(&self) -> Vec<u64> {
        self.inner()
            .events
            .iter()
            .filter_map(|e| match e {
                GatewayEvent::SwitchChain(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn waited_hashes(&self) -> Vec<B256> {
        self.inner()
            .events
            .iter()
            .filter_map(|e| match e {
                GatewayEvent::WaitStarted(hash) => Some(*hash),
                _ => None,
            })
            .collect()
    }

    /// Hashes for which a confirmed receipt was handed out.
    pub fn receipts(&self) -> Vec<B256> {
        self.inner()
            .events
            .iter()
            .filter_map(|e| match e {
                GatewayEvent::Receipt(hash) => Some(*hash),
                _ => None,
            })
            .collect()
    }

    fn confirm(&self, hash: B256, confirmations: u64) -> WaitOutcome {
        let mut inner = self.inner();
        inner.events.push(GatewayEvent::Receipt(hash));
        inner.next_block += 1;
        let block_number = inner.next_block;

        if let Some(kind) = inner.hash_kinds.get(&hash).copied() {
            if let Some(chain_id) = inner.chain_after.remove(&kind) {
                inner.active_chain = chain_id;
            }
        }

        WaitOutcome::Confirmed(TxReceipt {
            tx_hash: hash,
            block_number,
            confirmations,
        })
    }

    fn replace(&self, previous_hash: B256, reason: ReplacementReason, new_hash: B256) -> WaitOutcome {
        let mut inner = self.inner();
        if let Some(kind) = inner.hash_kinds.get(&previous_hash).copied() {
            inner.hash_kinds.insert(new_hash, kind);
        }
        WaitOutcome::Replaced(Replacement {
            reason,
            previous_hash,
            new_hash,
        })
    }
}

#[async_trait]
impl WalletGateway for ScriptedGateway {
    async fn active_chain(&self) -> Result<u64, GatewayError> {
        Ok(self.inner().active_chain)
    }

    async fn account(&self) -> Result<Option<Address>, GatewayError> {
        Ok(self.inner().account)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), GatewayError> {
        let mut inner = self.inner();
        inner.events.push(GatewayEvent::SwitchChain(chain_id));
        if let Some(error) = inner.switch_error.clone() {
            return Err(error);
        }
        inner.active_chain = chain_id;
        Ok(())
    }

    async fn write_contract(&self, call: &ContractCall) -> Result<B256, GatewayError> {
        let mut inner = self.inner();
        inner.writes.push(call.clone());

        if let Some(error) = inner.write_failures.get(&call.kind).cloned() {
            inner.events.push(GatewayEvent::Write {
                kind: call.kind,
                hash: None,
            });
            return Err(error);
        }

        inner.accepted_writes += 1;
        let hash = mock_hash(inner.accepted_writes);
        inner.hash_kinds.insert(hash, call.kind);
        if let Some(wait) = inner.kind_waits.remove(&call.kind) {
            inner.hash_waits.insert(hash, wait);
        }
        inner.events.push(GatewayEvent::Write {
            kind: call.kind,
            hash: Some(hash),
        });
        Ok(hash)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        confirmations: u64,
        _timeout: Duration,
    ) -> Result<WaitOutcome, GatewayError> {
        let script = {
            let mut inner = self.inner();
            inner.events.push(GatewayEvent::WaitStarted(tx_hash));
            inner
                .hash_waits
                .remove(&tx_hash)
                .unwrap_or(ScriptedWait::Confirm)
        };

        match script {
            ScriptedWait::Confirm => Ok(self.confirm(tx_hash, confirmations)),
            ScriptedWait::ConfirmAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(self.confirm(tx_hash, confirmations))
            }
            ScriptedWait::Replace { reason, new_hash } => {
                Ok(self.replace(tx_hash, reason, new_hash))
            }
            ScriptedWait::ReplaceAfter {
                delay,
                reason,
                new_hash,
            } => {
                tokio::time::sleep(delay).await;
                Ok(self.replace(tx_hash, reason, new_hash))
            }
            ScriptedWait::Hang => std::future::pending().await,
            ScriptedWait::Fail(error) => Err(error),
            ScriptedWait::GatewayTimeout => Ok(WaitOutcome::TimedOut),
        }
    }

    async fn token_decimals(&self, _chain_id: u64, _token: Address) -> Result<u8, GatewayError> {
        let (decimals, hang) = {
            let inner = self.inner();
            (inner.decimals, inner.decimals_hang)
        };
        if hang {
            return std::future::pending().await;
        }
        decimals.ok_or_else(|| GatewayError::Provider("decimals() call reverted".into()))
    }
}
