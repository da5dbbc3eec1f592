//! Transaction lifecycle.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key loading, signing)
//!     → transaction.rs (assemble + sign with a fresh nonce)
//!     → client.rs (RPC: nonce, broadcast, receipt)
//!     → watcher.rs (broadcast once, poll, classify)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;
pub mod watcher;

pub use client::{NetworkClient, RpcClient};
pub use transaction::{PendingTransaction, SignedTransaction, TransactionBuilder};
pub use types::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationOutcome, NetworkConfig, Receipt,
    ReceiptLookup,
};
pub use wallet::Account;
pub use watcher::ConfirmationWatcher;
