//! Post-submission confirmation tracking.
//!
//! The watcher owns a single absolute deadline per transaction. Each gateway
//! wait is raced against that deadline; when the deadline wins, the pending
//! wait is dropped and its eventual result never reaches the caller.

use std::time::Duration;

use alloy_primitives::B256;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::error::{GatewayError, WatchFailure};
use crate::gateway::{Replacement, ReplacementReason, TxReceipt, WaitOutcome, WalletGateway};

/// A transaction that reached its required confirmations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTx {
    /// Hash originally submitted.
    pub submitted_hash: B256,
    /// Receipt of the transaction that actually landed, which differs from
    /// `submitted_hash` after a speed-up.
    pub receipt: TxReceipt,
    pub replacements: Vec<Replacement>,
}

pub struct TransactionWatcher<'a, G: WalletGateway + ?Sized> {
    gateway: &'a G,
    confirmations: u64,
    budget: Duration,
}

impl<'a, G: WalletGateway + ?Sized> TransactionWatcher<'a, G> {
    pub fn new(gateway: &'a G, config: &FlowConfig) -> Self {
        Self {
            gateway,
            confirmations: config.confirmations,
            budget: config.confirmation_timeout(),
        }
    }

    /// Waits for `tx_hash`, starting the budget now.
    pub async fn watch(&self, tx_hash: B256) -> Result<ConfirmedTx, WatchFailure> {
        self.watch_until(tx_hash, Instant::now() + self.budget).await
    }

    /// Waits for `tx_hash` (or whatever replaces it) until `deadline`.
    pub async fn watch_until(
        &self,
        tx_hash: B256,
        deadline: Instant,
    ) -> Result<ConfirmedTx, WatchFailure> {
        let mut current = tx_hash;
        let mut replacements = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            debug!(tx_hash = %current, remaining_ms = remaining.as_millis() as u64, "waiting for receipt");

            let wait = self
                .gateway
                .wait_for_receipt(current, self.confirmations, remaining);

            let outcome = match timeout_at(deadline, wait).await {
                Ok(outcome) => outcome,
                Err(_elapsed) => {
                    warn!(tx_hash = %current, "confirmation budget exhausted");
                    return Err(self.timeout(current));
                }
            };

            match outcome {
                Ok(WaitOutcome::Confirmed(receipt)) => {
                    info!(
                        tx_hash = %receipt.tx_hash,
                        block = receipt.block_number,
                        "transaction confirmed"
                    );
                    return Ok(ConfirmedTx {
                        submitted_hash: tx_hash,
                        receipt,
                        replacements,
                    });
                }
                Ok(WaitOutcome::Replaced(replacement)) => match replacement.reason {
                    ReplacementReason::Replaced | ReplacementReason::Repriced => {
                        warn!(
                            previous = %replacement.previous_hash,
                            new = %replacement.new_hash,
                            reason = ?replacement.reason,
                            "transaction replaced, following new hash"
                        );
                        current = replacement.new_hash;
                        replacements.push(replacement);
                    }
                    ReplacementReason::Cancelled => {
                        warn!(tx_hash = %current, "transaction cancelled by replacement");
                        return Err(WatchFailure::Cancelled(current));
                    }
                },
                Ok(WaitOutcome::TimedOut) | Err(GatewayError::Timeout) => {
                    return Err(self.timeout(current));
                }
                Err(GatewayError::Reverted(hash)) => return Err(WatchFailure::Reverted(hash)),
                Err(e) => {
                    return Err(WatchFailure::Provider {
                        hash: current,
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    fn timeout(&self, hash: B256) -> WatchFailure {
        WatchFailure::Timeout {
            hash,
            budget_secs: self.budget.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_hash, ScriptedGateway, ScriptedWait};

    fn watcher_config() -> FlowConfig {
        FlowConfig::default()
    }

    #[tokio::test(start_paused = true)]
    async fn confirms_first_hash() {
        let gateway = ScriptedGateway::new(8453);
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        let confirmed = watcher.watch(mock_hash(1)).await.unwrap();
        assert_eq!(confirmed.receipt.tx_hash, mock_hash(1));
        assert_eq!(confirmed.submitted_hash, mock_hash(1));
        assert!(confirmed.replacements.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn follows_repriced_and_replaced() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(
            mock_hash(1),
            ScriptedWait::Replace {
                reason: ReplacementReason::Repriced,
                new_hash: mock_hash(50),
            },
        );
        gateway.script_hash_wait(
            mock_hash(50),
            ScriptedWait::Replace {
                reason: ReplacementReason::Replaced,
                new_hash: mock_hash(51),
            },
        );
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        let confirmed = watcher.watch(mock_hash(1)).await.unwrap();
        assert_eq!(confirmed.receipt.tx_hash, mock_hash(51));
        assert_eq!(confirmed.replacements.len(), 2);
        assert_eq!(
            gateway.waited_hashes(),
            vec![mock_hash(1), mock_hash(50), mock_hash(51)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_replacement_fails() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(
            mock_hash(1),
            ScriptedWait::Replace {
                reason: ReplacementReason::Cancelled,
                new_hash: mock_hash(60),
            },
        );
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        let err = watcher.watch(mock_hash(1)).await.unwrap_err();
        assert_eq!(err, WatchFailure::Cancelled(mock_hash(1)));
        // The cancelling transaction is never waited on.
        assert_eq!(gateway.waited_hashes(), vec![mock_hash(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn local_deadline_beats_hanging_gateway() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(mock_hash(1), ScriptedWait::Hang);
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        let started = Instant::now();
        let err = watcher.watch(mock_hash(1)).await.unwrap_err();
        assert_eq!(
            err,
            WatchFailure::Timeout {
                hash: mock_hash(1),
                budget_secs: 300
            }
        );
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(300) && elapsed < Duration::from_secs(301));
    }

    #[tokio::test(start_paused = true)]
    async fn receipt_just_inside_budget_wins() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(
            mock_hash(1),
            ScriptedWait::ConfirmAfter(Duration::from_secs(299)),
        );
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        assert!(watcher.watch(mock_hash(1)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn late_receipt_is_ignored() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(
            mock_hash(1),
            ScriptedWait::ConfirmAfter(Duration::from_secs(301)),
        );
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        let err = watcher.watch(mock_hash(1)).await.unwrap_err();
        assert!(matches!(err, WatchFailure::Timeout { .. }));
        assert!(gateway.receipts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn budget_spans_replacements() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(
            mock_hash(1),
            ScriptedWait::ReplaceAfter {
                delay: Duration::from_secs(200),
                reason: ReplacementReason::Repriced,
                new_hash: mock_hash(2),
            },
        );
        gateway.script_hash_wait(
            mock_hash(2),
            ScriptedWait::ConfirmAfter(Duration::from_secs(200)),
        );
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        let started = Instant::now();
        let err = watcher.watch(mock_hash(1)).await.unwrap_err();
        assert_eq!(
            err,
            WatchFailure::Timeout {
                hash: mock_hash(2),
                budget_secs: 300
            }
        );
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(300) && elapsed < Duration::from_secs(301));
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_errors_are_categorized() {
        let gateway = ScriptedGateway::new(8453);
        gateway.script_hash_wait(
            mock_hash(1),
            ScriptedWait::Fail(GatewayError::Reverted(mock_hash(1))),
        );
        gateway.script_hash_wait(
            mock_hash(2),
            ScriptedWait::Fail(GatewayError::Provider("connection reset".into())),
        );
        gateway.script_hash_wait(mock_hash(3), ScriptedWait::GatewayTimeout);
        let config = watcher_config();
        let watcher = TransactionWatcher::new(&gateway, &config);

        assert_eq!(
            watcher.watch(mock_hash(1)).await.unwrap_err(),
            WatchFailure::Reverted(mock_hash(1))
        );
        assert!(matches!(
            watcher.watch(mock_hash(2)).await.unwrap_err(),
            WatchFailure::Provider { message, .. } if message.contains("connection reset")
        ));
        assert!(matches!(
            watcher.watch(mock_hash(3)).await.unwrap_err(),
            WatchFailure::Timeout { .. }
        ));
    }
}
