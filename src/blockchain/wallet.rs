//! Account key handling and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, Signed, TxLegacy};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PREIMAGE_UPLOAD_PRIVATE_KEY";

/// A signing key and the address derived from it.
///
/// The account keeps no nonce: the network is the only source of truth for
/// the next sequence number and it is fetched right before each signature.
#[derive(Debug, Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    /// Create an account from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Account loaded");

        Ok(Self { signer })
    }

    /// Load the account from the environment.
    ///
    /// Reads `PREIMAGE_UPLOAD_PRIVATE_KEY`.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Get the account's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a legacy transaction.
    ///
    /// The chain id carried by `tx` is part of the signing hash (EIP-155), so
    /// the result only verifies on that chain.
    pub fn sign_legacy(&self, tx: TxLegacy) -> BlockchainResult<Signed<TxLegacy>> {
        if tx.chain_id.is_none() {
            return Err(BlockchainError::Wallet(
                "Refusing to sign a transaction without a chain id".to_string(),
            ));
        }

        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;

        Ok(tx.into_signed(signature))
    }
}
