use alloy_primitives::{Address, B256};
use serde::Serialize;
use vault_chains::{CallKind, ChainProfile};

use crate::error::ErrorKind;
use crate::gateway::{Replacement, TxReceipt};

/// Status of a deposit flow as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Idle,
    Switching,
    Depositing,
    Confirming,
    Completed,
    Error,
}

/// Inputs to the transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    Start { on_target_chain: bool },
    SwitchSucceeded,
    DepositSubmitted,
    Confirmed,
    Failed,
}

impl FlowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FlowStatus::Completed | FlowStatus::Error)
    }

    /// A deposit attempt is underway and owns the wallet.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            FlowStatus::Switching | FlowStatus::Depositing | FlowStatus::Confirming
        )
    }

    /// The transition function. `None` means the event is not legal here and
    /// must not change anything.
    pub fn on(self, event: FlowEvent) -> Option<FlowStatus> {
        use FlowEvent::*;
        use FlowStatus::*;

        match (self, event) {
            (Idle, Start { on_target_chain: false }) => Some(Switching),
            (Idle, Start { on_target_chain: true }) => Some(Depositing),
            (Switching, SwitchSucceeded) => Some(Depositing),
            (Depositing, DepositSubmitted) => Some(Confirming),
            (Confirming, Confirmed) => Some(Completed),
            (status, Failed) if !status.is_terminal() => Some(Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowStatus::Idle => "idle",
            FlowStatus::Switching => "switching",
            FlowStatus::Depositing => "depositing",
            FlowStatus::Confirming => "confirming",
            FlowStatus::Completed => "completed",
            FlowStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the deposit token is the chain's wrapped native currency, which
/// must be wrapped from the native balance before it can be approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    NativeWrapped,
    StandardToken,
}

impl TokenKind {
    pub fn classify(profile: &ChainProfile, token: &Address) -> Self {
        if profile.is_wrapped_native(token) {
            TokenKind::NativeWrapped
        } else {
            TokenKind::StandardToken
        }
    }
}

/// Observable state of one deposit flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositFlowState {
    pub status: FlowStatus,
    /// Most recent transaction hash: the step in progress, or the deposit
    /// once submitted.
    pub tx_hash: Option<B256>,
    pub message: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub token_kind: Option<TokenKind>,
    /// Deposit amount rendered with the token's decimals.
    pub amount_display: Option<String>,
    pub receipt: Option<TxReceipt>,
    /// Speed-ups and re-broadcasts the wallet made, across all steps.
    pub replacements: Vec<Replacement>,
    pub explorer_url: Option<String>,
    /// Steps whose receipts have been confirmed, in order.
    pub completed_steps: Vec<CallKind>,
    /// Every status this flow has been in, starting with `idle`.
    pub history: Vec<FlowStatus>,
}

impl Default for DepositFlowState {
    fn default() -> Self {
        Self {
            status: FlowStatus::Idle,
            tx_hash: None,
            message: None,
            error_kind: None,
            token_kind: None,
            amount_display: None,
            receipt: None,
            replacements: Vec::new(),
            explorer_url: None,
            completed_steps: Vec::new(),
            history: vec![FlowStatus::Idle],
        }
    }
}

impl DepositFlowState {
    /// Applies `event`, recording the new status. Returns `false` and leaves
    /// the state untouched if the transition is illegal.
    pub(crate) fn apply(&mut self, event: FlowEvent) -> bool {
        match self.status.on(event) {
            Some(next) => {
                self.status = next;
                self.history.push(next);
                true
            }
            None => false,
        }
    }
}
