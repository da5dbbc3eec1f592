//! Shared utilities for integration tests.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

use preimage_upload::blockchain::{
    BlockchainError, BlockchainResult, NetworkClient, Receipt, ReceiptLookup, SignedTransaction,
};

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// In-memory network with scripted answers.
///
/// Receipt queries pop from the script and answer "not found" once it is empty.
#[derive(Default)]
pub struct MockNetwork {
    nonce: u64,
    nonce_error: Mutex<Option<BlockchainError>>,
    broadcast_error: Mutex<Option<BlockchainError>>,
    receipts: Mutex<VecDeque<BlockchainResult<ReceiptLookup>>>,
    stored_size: Option<U256>,
    broadcasts: Mutex<Vec<Bytes>>,
    receipt_queries: Mutex<Vec<Instant>>,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn failing_nonce(self, error: BlockchainError) -> Self {
        *self.nonce_error.lock().unwrap() = Some(error);
        self
    }

    pub fn rejecting_broadcast(self, error: BlockchainError) -> Self {
        *self.broadcast_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_receipts(self, script: Vec<BlockchainResult<ReceiptLookup>>) -> Self {
        *self.receipts.lock().unwrap() = script.into();
        self
    }

    /// Size reported by `getPreimageSize` for any hash.
    pub fn with_stored_size(mut self, size: usize) -> Self {
        self.stored_size = Some(U256::from(size));
        self
    }

    pub fn broadcasts(&self) -> Vec<Bytes> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn receipt_queries(&self) -> Vec<Instant> {
        self.receipt_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkClient for MockNetwork {
    async fn next_sequence_number(&self, _address: Address) -> BlockchainResult<u64> {
        match self.nonce_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(self.nonce),
        }
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        if let Some(e) = self.broadcast_error.lock().unwrap().take() {
            return Err(e);
        }
        self.broadcasts.lock().unwrap().push(tx.encoded());
        Ok(tx.hash())
    }

    async fn receipt_for(&self, _tx_hash: TxHash) -> BlockchainResult<ReceiptLookup> {
        self.receipt_queries.lock().unwrap().push(Instant::now());
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ReceiptLookup::NotFound))
    }

    async fn call(&self, _to: Address, _input: Bytes) -> BlockchainResult<Bytes> {
        match self.stored_size {
            Some(size) => Ok(size.abi_encode().into()),
            None => Err(BlockchainError::Rpc("execution reverted".into())),
        }
    }
}

/// A receipt with the given status flag.
#[allow(dead_code)]
pub fn receipt(status: bool) -> ReceiptLookup {
    ReceiptLookup::Found(Receipt {
        transaction_hash: TxHash::repeat_byte(0x5a),
        status,
        block_number: Some(1_024),
        block_hash: Some(B256::repeat_byte(0x0b)),
        gas_used: 120_000,
    })
}
