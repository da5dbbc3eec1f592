//! Broadcast and confirmation monitoring.
//!
//! # Responsibilities
//! - Broadcast a signed transaction once
//! - Poll for its receipt on a fixed interval
//! - Classify each poll: pending, included, or failed
//! - Stop on deadline or external cancellation
//!
//! ```text
//! [Built] --broadcast--> [Submitted] --poll--> [Submitted]  (not found, loop)
//!                                    --poll--> [Included]   (receipt, any status)
//!                                    --poll--> [Errored]    (query failed)
//!                                    --deadline--> [TimedOut]
//!                                    --cancel--> [Canceled]
//! ```

use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use crate::blockchain::client::NetworkClient;
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationOutcome, ReceiptLookup,
};
use crate::config::schema::ConfirmationConfig;

/// Broadcasts transactions and waits for them to be included.
pub struct ConfirmationWatcher<C> {
    client: C,
    poll_interval: Duration,
    max_wait: Duration,
}

impl<C: NetworkClient> ConfirmationWatcher<C> {
    /// Create a watcher using the configured interval and deadline.
    pub fn new(client: C, config: &ConfirmationConfig) -> BlockchainResult<Self> {
        Self::with_timing(client, config.poll_interval(), config.max_wait())
    }

    /// Fails with [`BlockchainError::Config`] for a zero poll interval.
    pub fn with_timing(
        client: C,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> BlockchainResult<Self> {
        if poll_interval.is_zero() {
            return Err(BlockchainError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            client,
            poll_interval,
            max_wait,
        })
    }

    /// Broadcast `tx`. An error here is final; nothing is polled.
    pub async fn submit(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        let tx_hash = self.client.broadcast(tx).await.map_err(|e| {
            tracing::error!(tx_hash = %tx.hash(), error = %e, "Broadcast failed");
            e
        })?;

        tracing::info!(tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }

    /// Run a single receipt query and classify it.
    pub async fn poll_once(&self, tx_hash: TxHash) -> ConfirmationOutcome {
        match self.client.receipt_for(tx_hash).await {
            Ok(ReceiptLookup::Found(receipt)) => ConfirmationOutcome::Included(receipt),
            Ok(ReceiptLookup::NotFound) => ConfirmationOutcome::StillPending,
            Err(e) => ConfirmationOutcome::Errored(e),
        }
    }

    /// Poll until `tx_hash` reaches a terminal outcome.
    ///
    /// The first query is issued one interval after the call. Never returns
    /// [`ConfirmationOutcome::StillPending`].
    pub async fn wait_for_inclusion(
        &self,
        tx_hash: TxHash,
        mut cancel: broadcast::Receiver<()>,
    ) -> ConfirmationOutcome {
        let start = Instant::now();
        let deadline = sleep_until(start + self.max_wait);
        tokio::pin!(deadline);

        let mut ticker = interval_at(start + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cancel_open = true;
        let mut attempt: u32 = 0;

        loop {
            tokio::select! {
                biased;

                signal = cancel.recv(), if cancel_open => match signal {
                    Err(RecvError::Closed) => cancel_open = false,
                    _ => {
                        tracing::warn!(tx_hash = %tx_hash, attempts = attempt, "Wait canceled");
                        return ConfirmationOutcome::Canceled;
                    }
                },

                _ = &mut deadline => {
                    tracing::warn!(
                        tx_hash = %tx_hash,
                        attempts = attempt,
                        max_wait_secs = self.max_wait.as_secs(),
                        "Transaction still pending at deadline"
                    );
                    return ConfirmationOutcome::TimedOut;
                }

                _ = ticker.tick() => {
                    attempt += 1;
                    let outcome = self.poll_once(tx_hash).await;
                    match &outcome {
                        ConfirmationOutcome::StillPending => {
                            tracing::debug!(tx_hash = %tx_hash, attempt, "Transaction pending");
                        }
                        ConfirmationOutcome::Included(receipt) => {
                            tracing::info!(
                                tx_hash = %tx_hash,
                                attempt,
                                block_number = ?receipt.block_number,
                                status = receipt.status,
                                "Transaction included"
                            );
                        }
                        ConfirmationOutcome::Errored(e) => {
                            tracing::error!(tx_hash = %tx_hash, attempt, error = %e, "Receipt query failed");
                        }
                        ConfirmationOutcome::TimedOut | ConfirmationOutcome::Canceled => {}
                    }

                    if outcome.is_terminal() {
                        return outcome;
                    }
                }
            }
        }
    }

    /// Broadcast `tx`, then wait for its terminal outcome.
    ///
    /// Returns `Err` only when the broadcast itself fails.
    pub async fn submit_and_wait(
        &self,
        tx: &SignedTransaction,
        cancel: broadcast::Receiver<()>,
    ) -> BlockchainResult<ConfirmationOutcome> {
        self.submit(tx).await?;
        Ok(self.wait_for_inclusion(tx.hash(), cancel).await)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::TransactionBuilder;
    use crate::blockchain::types::{ChainId, Receipt};
    use crate::blockchain::wallet::Account;
    use crate::config::schema::TransactionConfig;
    use crate::lifecycle::Shutdown;
    use alloy::primitives::{Address, Bytes, B256};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers receipt queries from a script, then keeps answering "not found".
    #[derive(Default)]
    struct ScriptedClient {
        receipts: Mutex<VecDeque<BlockchainResult<ReceiptLookup>>>,
        queried_at: Mutex<Vec<Instant>>,
        reject_broadcast: bool,
    }

    impl ScriptedClient {
        fn new(script: Vec<BlockchainResult<ReceiptLookup>>) -> Self {
            Self {
                receipts: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        fn rejecting() -> Self {
            Self {
                reject_broadcast: true,
                ..Self::default()
            }
        }

        fn queries(&self) -> Vec<Instant> {
            self.queried_at.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NetworkClient for ScriptedClient {
        async fn next_sequence_number(&self, _address: Address) -> BlockchainResult<u64> {
            Ok(0)
        }

        async fn broadcast(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
            if self.reject_broadcast {
                return Err(BlockchainError::Broadcast("insufficient funds".into()));
            }
            Ok(tx.hash())
        }

        async fn receipt_for(&self, _tx_hash: TxHash) -> BlockchainResult<ReceiptLookup> {
            self.queried_at.lock().unwrap().push(Instant::now());
            self.receipts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(ReceiptLookup::NotFound))
        }

        async fn call(&self, _to: Address, _input: Bytes) -> BlockchainResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    fn receipt(status: bool) -> Receipt {
        Receipt {
            transaction_hash: TxHash::repeat_byte(0x11),
            status,
            block_number: Some(12),
            block_hash: Some(B256::repeat_byte(0x22)),
            gas_used: 60_000,
        }
    }

    fn watcher(script: Vec<BlockchainResult<ReceiptLookup>>) -> ConfirmationWatcher<ScriptedClient> {
        ConfirmationWatcher::with_timing(
            ScriptedClient::new(script),
            Duration::from_secs(5),
            Duration::from_secs(600),
        )
        .unwrap()
    }

    fn signed_tx() -> SignedTransaction {
        let account = Account::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        TransactionBuilder::new(account, ChainId(901), &TransactionConfig::default())
            .build(Address::repeat_byte(0xcc), Bytes::from_static(b"payload"), 0)
            .unwrap()
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = ConfirmationWatcher::with_timing(
            ScriptedClient::default(),
            Duration::ZERO,
            Duration::from_secs(600),
        );
        assert!(matches!(result, Err(BlockchainError::Config(_))));

        let config = ConfirmationConfig {
            poll_interval_secs: 0,
            max_wait_secs: 600,
        };
        assert!(ConfirmationWatcher::new(ScriptedClient::default(), &config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_and_wait_until_included() {
        let watcher = watcher(vec![
            Ok(ReceiptLookup::NotFound),
            Ok(ReceiptLookup::Found(receipt(true))),
        ]);
        let shutdown = Shutdown::new();

        let outcome = watcher
            .submit_and_wait(&signed_tx(), shutdown.subscribe())
            .await
            .unwrap();

        assert!(matches!(outcome, ConfirmationOutcome::Included(ref r) if r.succeeded()));
        assert_eq!(watcher.client().queries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_broadcast_skips_polling() {
        let watcher = ConfirmationWatcher::with_timing(
            ScriptedClient::rejecting(),
            Duration::from_secs(5),
            Duration::from_secs(600),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let result = watcher.submit_and_wait(&signed_tx(), shutdown.subscribe()).await;

        assert!(matches!(result, Err(BlockchainError::Broadcast(_))));
        assert!(watcher.client().queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_receipt_found() {
        let watcher = watcher(vec![
            Ok(ReceiptLookup::NotFound),
            Ok(ReceiptLookup::NotFound),
            Ok(ReceiptLookup::NotFound),
            Ok(ReceiptLookup::Found(receipt(true))),
        ]);
        let shutdown = Shutdown::new();
        let start = Instant::now();

        let outcome = watcher
            .wait_for_inclusion(TxHash::repeat_byte(0x11), shutdown.subscribe())
            .await;

        assert!(matches!(outcome, ConfirmationOutcome::Included(ref r) if r.status));

        let queries = watcher.client().queries();
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[0] - start, Duration::from_secs(5));
        for pair in queries.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_receipt_is_still_included() {
        let watcher = watcher(vec![Ok(ReceiptLookup::Found(receipt(false)))]);
        let shutdown = Shutdown::new();

        let outcome = watcher
            .wait_for_inclusion(TxHash::repeat_byte(0x11), shutdown.subscribe())
            .await;

        match outcome {
            ConfirmationOutcome::Included(r) => assert!(!r.succeeded()),
            other => panic!("expected Included, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_stops_immediately() {
        let watcher = watcher(vec![
            Err(BlockchainError::Rpc("connection reset".into())),
            Ok(ReceiptLookup::Found(receipt(true))),
        ]);
        let shutdown = Shutdown::new();

        let outcome = watcher
            .wait_for_inclusion(TxHash::repeat_byte(0x11), shutdown.subscribe())
            .await;

        assert!(matches!(outcome, ConfirmationOutcome::Errored(BlockchainError::Rpc(_))));
        assert_eq!(watcher.client().queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_while_pending() {
        let watcher = ConfirmationWatcher::with_timing(
            ScriptedClient::default(),
            Duration::from_secs(5),
            Duration::from_secs(12),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let outcome = watcher
            .wait_for_inclusion(TxHash::repeat_byte(0x11), shutdown.subscribe())
            .await;

        assert!(matches!(outcome, ConfirmationOutcome::TimedOut));
        assert_eq!(watcher.client().queries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unblocks_wait() {
        let watcher = watcher(Vec::new());
        let shutdown = Shutdown::new();
        let cancel = shutdown.subscribe();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            shutdown.trigger();
        });

        let outcome = watcher
            .wait_for_inclusion(TxHash::repeat_byte(0x11), cancel)
            .await;

        assert!(matches!(outcome, ConfirmationOutcome::Canceled));
        assert_eq!(watcher.client().queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_shutdown_does_not_cancel() {
        let watcher = watcher(vec![
            Ok(ReceiptLookup::NotFound),
            Ok(ReceiptLookup::Found(receipt(true))),
        ]);
        let cancel = Shutdown::new().subscribe();

        let outcome = watcher
            .wait_for_inclusion(TxHash::repeat_byte(0x11), cancel)
            .await;

        assert!(matches!(outcome, ConfirmationOutcome::Included(_)));
        assert_eq!(watcher.client().queries().len(), 2);
    }
}
