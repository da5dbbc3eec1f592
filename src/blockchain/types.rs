//! Chain-specific types and error definitions.

use alloy::primitives::{TxHash, B256};
use alloy::rpc::types::TransactionReceipt;
use serde::Serialize;
use thiserror::Error;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::NetworkConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The network refused to accept a transaction.
    #[error("Broadcast rejected: {0}")]
    Broadcast(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Call payload could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A setting that cannot be used as given.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Inclusion record for a transaction, reduced to what callers branch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    /// `true` if execution succeeded, `false` if it reverted.
    pub status: bool,
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    pub gas_used: u64,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status
    }
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            status: receipt.status(),
            block_number: receipt.block_number,
            block_hash: receipt.block_hash,
            gas_used: receipt.gas_used,
        }
    }
}

/// Result of a single receipt query.
///
/// `NotFound` is the steady state while a transaction sits in the mempool and
/// is kept apart from [`BlockchainError`] so callers never classify it by text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptLookup {
    Found(Receipt),
    NotFound,
}

impl From<Option<TransactionReceipt>> for ReceiptLookup {
    fn from(receipt: Option<TransactionReceipt>) -> Self {
        match receipt {
            Some(r) => Self::Found(r.into()),
            None => Self::NotFound,
        }
    }
}

/// Outcome of watching a broadcast transaction.
#[derive(Debug)]
pub enum ConfirmationOutcome {
    /// Included in a block. The receipt status still has to be checked.
    Included(Receipt),
    /// Not yet observed on chain.
    StillPending,
    /// A receipt query failed for a reason other than "not found".
    Errored(BlockchainError),
    /// The maximum wait elapsed while the transaction was still pending.
    TimedOut,
    /// The wait was canceled by an external signal.
    Canceled,
}

impl ConfirmationOutcome {
    /// Whether the poll loop should stop at this outcome.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::StillPending)
    }
}
