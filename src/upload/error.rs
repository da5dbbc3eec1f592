//! Upload failure taxonomy.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// Every way an upload can end without success.
///
/// All variants are fatal; nothing here is retried.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Bad invocation, unreadable file or invalid configuration.
    #[error("Input error: {0}")]
    Input(String),

    /// Key material or calldata could not be produced.
    #[error("Construction error: {0}")]
    Construction(#[source] BlockchainError),

    /// The node could not be reached or queried before building the transaction.
    #[error("Network unavailable: {0}")]
    Network(#[source] BlockchainError),

    /// Querying the account nonce failed.
    #[error("Could not fetch nonce: {0}")]
    Sequence(#[source] BlockchainError),

    /// The network did not accept the transaction.
    #[error("Broadcast failed: {0}")]
    Broadcast(#[source] BlockchainError),

    /// A receipt query failed for a reason other than "not found".
    #[error("Polling failed for {tx_hash}: {source}")]
    Polling {
        tx_hash: TxHash,
        #[source]
        source: BlockchainError,
    },

    /// Included, but execution reverted.
    #[error("Transaction failed: {tx_hash} reverted in block {block_number:?}")]
    ApplicationFailure {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },

    /// Still pending when the maximum wait elapsed.
    #[error("Transaction {tx_hash} still pending after {waited_secs} seconds")]
    TimedOut { tx_hash: TxHash, waited_secs: u64 },

    /// The wait was canceled while the transaction was pending.
    #[error("Canceled while waiting for {tx_hash}")]
    Canceled { tx_hash: TxHash },

    /// Post-upload read-back did not match.
    #[error("Verification failed: {0}")]
    Verification(String),

    /// The flow reached a state it has no classification for.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UploadError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) => 2,
            Self::ApplicationFailure { .. } => 3,
            Self::TimedOut { .. } | Self::Canceled { .. } => 4,
            _ => 1,
        }
    }

    /// Classify a failed chain id check. A mismatch is a configuration
    /// problem; anything else means the node is unusable.
    pub fn from_chain_check(error: BlockchainError) -> Self {
        match error {
            BlockchainError::ChainMismatch { expected, actual } => Self::Input(format!(
                "node reports chain id {}, configured chain id is {}",
                actual, expected
            )),
            other => Self::Network(other),
        }
    }
}

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;
