//! The deposit state machine.
//!
//! One [`DepositOrchestrator`] drives exactly one deposit. Steps run strictly
//! in sequence (wrap, approve, deposit), each waiting for its receipt before
//! the next is signed, because approve must see the wrapped balance and the
//! deposit must see the allowance. All state changes go through
//! [`FlowStatus::on`](crate::state::FlowStatus::on) and are published on a
//! watch channel; errors end the flow in the `error` status and never escape
//! [`DepositOrchestrator::start`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};
use vault_chains::address::short_address;
use vault_chains::calls::{encode_approve, encode_deposit, encode_wrap};
use vault_chains::units::format_units;
use vault_chains::{CallKind, ChainProfile, ChainRegistry};

use crate::config::{ConfigError, FlowConfig};
use crate::error::FlowError;
use crate::gateway::{ContractCall, WalletGateway};
use crate::request::DepositRequest;
use crate::state::{DepositFlowState, FlowEvent, TokenKind};
use crate::watcher::{ConfirmedTx, TransactionWatcher};

pub struct DepositOrchestrator<G: WalletGateway> {
    gateway: Arc<G>,
    registry: ChainRegistry,
    config: FlowConfig,
    state: watch::Sender<DepositFlowState>,
    started: AtomicBool,
}

impl<G: WalletGateway + 'static> DepositOrchestrator<G> {
    /// Fails if `config` does not pass [`FlowConfig::validate`].
    pub fn new(
        gateway: Arc<G>,
        registry: ChainRegistry,
        config: FlowConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state, _) = watch::channel(DepositFlowState::default());
        Ok(Self {
            gateway,
            registry,
            config,
            state,
            started: AtomicBool::new(false),
        })
    }

    /// Current state of the flow.
    pub fn snapshot(&self) -> DepositFlowState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<DepositFlowState> {
        self.state.subscribe()
    }

    /// Runs the deposit to a terminal status and returns the final state.
    ///
    /// Only the first call does anything. Later calls, whether the flow is
    /// still in flight or already finished, log a warning and return the
    /// current state unchanged.
    pub async fn start(&self, request: DepositRequest) -> DepositFlowState {
        if self.started.swap(true, Ordering::SeqCst) {
            let status = self.state.borrow().status;
            if status.is_in_flight() {
                warn!(%status, "deposit still in flight on this flow, ignoring");
            } else {
                warn!(%status, "deposit flow already used, start a new one");
            }
            return self.snapshot();
        }

        info!(
            chain_id = request.chain_id(),
            vault = %short_address(&request.vault()),
            vault_id = request.vault_id().unwrap_or("-"),
            amount = %request.amount(),
            "starting deposit"
        );

        let profile = match request.validate(&self.registry) {
            Ok(profile) => profile.clone(),
            Err(e) => {
                self.fail(FlowError::from(e), None);
                return self.snapshot();
            }
        };

        match self.run(&request, &profile).await {
            Ok(confirmed) => self.complete(&profile, confirmed),
            Err(e) => self.fail(e, Some(&profile)),
        }

        self.snapshot()
    }

    /// Runs [`DepositOrchestrator::start`] on the runtime. Dropping the
    /// handle does not stop the flow.
    pub fn spawn(self: Arc<Self>, request: DepositRequest) -> JoinHandle<DepositFlowState> {
        tokio::spawn(async move { self.start(request).await })
    }

    async fn run(
        &self,
        request: &DepositRequest,
        profile: &ChainProfile,
    ) -> Result<ConfirmedTx, FlowError> {
        let account = self
            .gateway
            .account()
            .await?
            .ok_or(FlowError::NotConnected)?;

        let token_kind = TokenKind::classify(profile, &request.token());
        self.state.send_modify(|s| s.token_kind = Some(token_kind));
        info!(account = %short_address(&account), ?token_kind, "classified deposit token");

        let active = self.gateway.active_chain().await?;
        if active == request.chain_id() {
            self.transition(
                FlowEvent::Start {
                    on_target_chain: true,
                },
                "Initiating deposit...".into(),
            );
        } else {
            self.transition(
                FlowEvent::Start {
                    on_target_chain: false,
                },
                format!("Switching to {}...", profile.name),
            );
            info!(from = active, to = request.chain_id(), "requesting chain switch");
            self.gateway.switch_chain(request.chain_id()).await?;
            self.transition(
                FlowEvent::SwitchSucceeded,
                format!("Switched to {}", profile.name),
            );
        }

        let amount = self.display_amount(request, profile, token_kind).await;
        self.state
            .send_modify(|s| s.amount_display = Some(amount.clone()));

        if token_kind == TokenKind::NativeWrapped {
            self.set_message(format!("Wrapping {amount}..."));
            let wrap = contract_call(
                request,
                CallKind::Wrap,
                request.token(),
                encode_wrap(),
                request.amount(),
            );
            self.submit_and_confirm(wrap).await?;
        }

        let approve_message = match token_kind {
            TokenKind::NativeWrapped => "Approving wrapped token...",
            TokenKind::StandardToken => "Approving token...",
        };
        self.set_message(approve_message.into());
        let approve = contract_call(
            request,
            CallKind::Approve,
            request.token(),
            encode_approve(request.vault(), request.amount()),
            U256::ZERO,
        );
        self.submit_and_confirm(approve).await?;

        self.set_message(format!("Depositing {amount} to vault..."));
        let deposit = contract_call(
            request,
            CallKind::Deposit,
            request.vault(),
            encode_deposit(request.amount()),
            U256::ZERO,
        );
        let hash = self.submit(&deposit).await?;
        self.state.send_modify(|s| {
            s.tx_hash = Some(hash);
            s.explorer_url = Some(profile.tx_url(&hash));
        });
        self.transition(FlowEvent::DepositSubmitted, "Waiting for confirmation...".into());

        let confirmed = self.watcher().watch(hash).await?;
        Ok(confirmed)
    }

    /// Re-reads the active chain and submits `call` only if it still matches.
    async fn submit(&self, call: &ContractCall) -> Result<B256, FlowError> {
        let active = self.gateway.active_chain().await?;
        if active != call.chain_id {
            warn!(
                expected = call.chain_id,
                active,
                step = %call.kind,
                "active chain changed mid-flow"
            );
            return Err(FlowError::ChainMismatch {
                expected: call.chain_id,
                active,
            });
        }

        let hash = self.gateway.write_contract(call).await?;
        info!(step = %call.kind, tx_hash = %hash, chain_id = call.chain_id, "submitted contract call");
        self.state.send_modify(|s| s.tx_hash = Some(hash));
        Ok(hash)
    }

    /// Submits a preparatory step and waits for its receipt.
    async fn submit_and_confirm(&self, call: ContractCall) -> Result<(), FlowError> {
        let hash = self.submit(&call).await?;
        let confirmed = self.watcher().watch(hash).await?;
        self.state.send_modify(|s| {
            s.tx_hash = Some(confirmed.receipt.tx_hash);
            s.completed_steps.push(call.kind);
            s.replacements.extend(confirmed.replacements);
        });
        Ok(())
    }

    fn watcher(&self) -> TransactionWatcher<'_, G> {
        TransactionWatcher::new(self.gateway.as_ref(), &self.config)
    }

    /// Amount with symbol, using the token's own decimals when the gateway
    /// can read them within the configured budget.
    async fn display_amount(
        &self,
        request: &DepositRequest,
        profile: &ChainProfile,
        token_kind: TokenKind,
    ) -> String {
        let read = self
            .gateway
            .token_decimals(request.chain_id(), request.token());
        let decimals = match timeout(self.config.decimals_timeout(), read).await {
            Ok(Ok(decimals)) => decimals,
            Ok(Err(e)) => {
                warn!(error = %e, fallback = profile.decimals, "could not read token decimals");
                profile.decimals
            }
            Err(_elapsed) => {
                warn!(
                    timeout_ms = self.config.decimals_timeout_ms,
                    fallback = profile.decimals,
                    "token decimals read timed out"
                );
                profile.decimals
            }
        };

        let value = format_units(request.amount(), decimals);
        match (token_kind, profile.wrapped_native) {
            (TokenKind::NativeWrapped, Some(_)) => format!("{value} {}", profile.symbol),
            _ => format!("{value} of token {}", short_address(&request.token())),
        }
    }

    fn set_message(&self, message: String) {
        info!(%message, "deposit progress");
        self.state.send_modify(|s| s.message = Some(message));
    }

    fn transition(&self, event: FlowEvent, message: String) {
        self.state.send_if_modified(|s| {
            let from = s.status;
            if !s.apply(event) {
                warn!(%from, ?event, "ignoring illegal transition");
                return false;
            }
            info!(%from, to = %s.status, "deposit status changed");
            s.message = Some(message);
            true
        });
    }

    fn complete(&self, profile: &ChainProfile, confirmed: ConfirmedTx) {
        let hash = confirmed.receipt.tx_hash;
        self.state.send_modify(|s| {
            s.tx_hash = Some(hash);
            s.explorer_url = Some(profile.tx_url(&hash));
            s.completed_steps.push(CallKind::Deposit);
            s.receipt = Some(confirmed.receipt.clone());
            s.replacements.extend(confirmed.replacements.iter().cloned());
        });
        self.transition(
            FlowEvent::Confirmed,
            format!(
                "Deposit confirmed in block {}",
                confirmed.receipt.block_number
            ),
        );
    }

    fn fail(&self, error: FlowError, profile: Option<&ChainProfile>) {
        warn!(error = %error, kind = ?error.kind(), "deposit failed");

        self.state.send_if_modified(|s| {
            if !s.apply(FlowEvent::Failed) {
                return false;
            }

            let mut message = error.to_string();
            if let Some(note) = progress_note(&s.completed_steps, profile) {
                message.push_str(". ");
                message.push_str(&note);
            }

            if let Some(hash) = error.tx_hash() {
                s.tx_hash = Some(hash);
                if let Some(profile) = profile {
                    s.explorer_url = Some(profile.tx_url(&hash));
                }
            }
            s.error_kind = Some(error.kind());
            s.message = Some(message);
            true
        });
    }
}

fn contract_call(
    request: &DepositRequest,
    kind: CallKind,
    to: Address,
    data: Vec<u8>,
    value: U256,
) -> ContractCall {
    ContractCall {
        kind,
        chain_id: request.chain_id(),
        to,
        data,
        value,
    }
}

/// Tells the user what already happened on-chain before a failure.
fn progress_note(completed: &[CallKind], profile: Option<&ChainProfile>) -> Option<String> {
    if completed.is_empty() {
        return None;
    }

    let steps: Vec<String> = completed.iter().map(|k| k.to_string()).collect();
    let mut note = format!("Already confirmed on-chain: {}", steps.join(", "));

    if completed.contains(&CallKind::Wrap) {
        let symbol = profile
            .and_then(|p| p.wrapped_native)
            .map(|w| w.symbol)
            .unwrap_or("wrapped native token");
        note.push_str(&format!("; your funds are now held as {symbol}"));
    }

    Some(note)
}

impl<G: WalletGateway> std::fmt::Debug for DepositOrchestrator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepositOrchestrator")
            .field("status", &self.state.borrow().status)
            .field("config", &self.config)
            .finish()
    }
}
