//! Single-preimage upload flow.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash, B256, U256};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::transaction::{SignedTransaction, TransactionBuilder};
use crate::blockchain::types::{ChainId, ConfirmationOutcome, Receipt};
use crate::blockchain::wallet::Account;
use crate::blockchain::watcher::ConfirmationWatcher;
use crate::config::schema::UploadConfig;
use crate::config::{validate_config, ConfigError};
use crate::registry::{
    CallEncoder, ContentAddresser, Keccak256Addresser, PreimageRegistry, RegistryEncoder,
    ADD_PREIMAGE,
};
use crate::upload::error::{UploadError, UploadResult};

/// A signed `addPreimage` transaction that has not been broadcast yet.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub preimage_hash: B256,
    pub preimage_len: usize,
    pub nonce: u64,
    pub transaction: SignedTransaction,
}

/// Final record of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub preimage_hash: B256,
    pub preimage_len: usize,
    pub sender: Address,
    pub nonce: u64,
    pub transaction_hash: TxHash,
    pub receipt: Receipt,
}

/// Drives one upload from bytes to a classified receipt.
pub struct Uploader<C> {
    client: Arc<C>,
    builder: TransactionBuilder,
    watcher: ConfirmationWatcher<Arc<C>>,
    addresser: Box<dyn ContentAddresser>,
    encoder: Box<dyn CallEncoder>,
    registry: Address,
}

impl<C: NetworkClient> Uploader<C> {
    /// Wire an uploader from configuration, using the default addresser and encoder.
    ///
    /// The configuration is validated first; any problem is an [`UploadError::Input`].
    pub fn new(client: Arc<C>, account: Account, config: &UploadConfig) -> UploadResult<Self> {
        validate_config(config)
            .map_err(|errors| UploadError::Input(ConfigError::Validation(errors).to_string()))?;

        let registry: Address = config.transaction.registry_address.parse().map_err(|e| {
            UploadError::Input(format!(
                "Invalid registry address '{}': {}",
                config.transaction.registry_address, e
            ))
        })?;

        let builder = TransactionBuilder::new(
            account,
            ChainId(config.network.chain_id),
            &config.transaction,
        );
        let watcher = ConfirmationWatcher::new(client.clone(), &config.confirmation)
            .map_err(|e| UploadError::Input(e.to_string()))?;

        Ok(Self {
            client,
            builder,
            watcher,
            addresser: Box::new(Keccak256Addresser),
            encoder: Box::new(RegistryEncoder::new()),
            registry,
        })
    }

    /// Replace the content addresser.
    pub fn with_addresser(mut self, addresser: impl ContentAddresser + 'static) -> Self {
        self.addresser = Box::new(addresser);
        self
    }

    /// Replace the watcher, e.g. to change polling timing.
    pub fn with_watcher(mut self, watcher: ConfirmationWatcher<Arc<C>>) -> Self {
        self.watcher = watcher;
        self
    }

    /// Content address of `preimage`. Makes no network request.
    pub fn preimage_hash(&self, preimage: &[u8]) -> B256 {
        self.addresser.hash(preimage)
    }

    /// Hash, encode and sign `preimage` at the account's current nonce.
    pub async fn prepare(&self, preimage: &[u8]) -> UploadResult<PreparedUpload> {
        let preimage_hash = self.preimage_hash(preimage);

        let payload = self
            .encoder
            .encode(ADD_PREIMAGE, &[DynSolValue::Bytes(preimage.to_vec())])
            .map_err(UploadError::Construction)?;

        // Fetched as late as possible: the nonce is only good for one slot.
        let nonce = self
            .client
            .next_sequence_number(self.builder.address())
            .await
            .map_err(UploadError::Sequence)?;

        let transaction = self
            .builder
            .build(self.registry, payload, nonce)
            .map_err(UploadError::Construction)?;

        tracing::info!(
            preimage_hash = %preimage_hash,
            preimage_len = preimage.len(),
            nonce,
            tx_hash = %transaction.hash(),
            "Upload prepared"
        );

        Ok(PreparedUpload {
            preimage_hash,
            preimage_len: preimage.len(),
            nonce,
            transaction,
        })
    }

    /// Broadcast a prepared upload. Never retried.
    pub async fn submit(&self, prepared: &PreparedUpload) -> UploadResult<TxHash> {
        self.watcher
            .submit(&prepared.transaction)
            .await
            .map_err(UploadError::Broadcast)
    }

    /// Wait for a submitted upload and classify the result.
    pub async fn confirm(
        &self,
        prepared: &PreparedUpload,
        cancel: broadcast::Receiver<()>,
    ) -> UploadResult<UploadReport> {
        let outcome = self
            .watcher
            .wait_for_inclusion(prepared.transaction.hash(), cancel)
            .await;
        self.conclude(prepared, outcome)
    }

    /// Prepare, then broadcast and wait in one call.
    pub async fn upload(
        &self,
        preimage: &[u8],
        cancel: broadcast::Receiver<()>,
    ) -> UploadResult<UploadReport> {
        let prepared = self.prepare(preimage).await?;
        let outcome = self
            .watcher
            .submit_and_wait(&prepared.transaction, cancel)
            .await
            .map_err(UploadError::Broadcast)?;
        self.conclude(&prepared, outcome)
    }

    /// Map a watcher outcome onto the upload result. Only a successful
    /// receipt status produces a report.
    fn conclude(
        &self,
        prepared: &PreparedUpload,
        outcome: ConfirmationOutcome,
    ) -> UploadResult<UploadReport> {
        let tx_hash = prepared.transaction.hash();

        match outcome {
            ConfirmationOutcome::Included(receipt) if receipt.succeeded() => Ok(UploadReport {
                preimage_hash: prepared.preimage_hash,
                preimage_len: prepared.preimage_len,
                sender: self.builder.address(),
                nonce: prepared.nonce,
                transaction_hash: tx_hash,
                receipt,
            }),
            ConfirmationOutcome::Included(receipt) => Err(UploadError::ApplicationFailure {
                tx_hash,
                block_number: receipt.block_number,
            }),
            ConfirmationOutcome::Errored(source) => Err(UploadError::Polling { tx_hash, source }),
            ConfirmationOutcome::TimedOut => Err(UploadError::TimedOut {
                tx_hash,
                waited_secs: self.max_wait_secs(),
            }),
            ConfirmationOutcome::Canceled => Err(UploadError::Canceled { tx_hash }),
            ConfirmationOutcome::StillPending => Err(UploadError::Internal(format!(
                "wait for {} ended without a terminal outcome",
                tx_hash
            ))),
        }
    }

    /// Check that the registry reports the uploaded size for the preimage hash.
    pub async fn verify(&self, report: &UploadReport) -> UploadResult<()> {
        let registry = PreimageRegistry::new(self.client.clone(), self.registry);
        let size = registry
            .preimage_size(report.preimage_hash)
            .await
            .map_err(|e| UploadError::Verification(e.to_string()))?;

        if size != U256::from(report.preimage_len) {
            return Err(UploadError::Verification(format!(
                "registry reports {} bytes for {}, uploaded {}",
                size, report.preimage_hash, report.preimage_len
            )));
        }

        tracing::info!(preimage_hash = %report.preimage_hash, size = %size, "Preimage verified");
        Ok(())
    }

    pub fn sender(&self) -> Address {
        self.builder.address()
    }

    fn max_wait_secs(&self) -> u64 {
        self.watcher.max_wait().as_secs()
    }
}
