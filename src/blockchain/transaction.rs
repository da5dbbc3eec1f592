//! Transaction construction and signing.
//!
//! # Responsibilities
//! - Assemble an unsigned legacy transaction from fixed gas parameters
//! - Sign it with EIP-155 replay protection
//! - Expose the network encoding and content-derived hash
//!
//! No network I/O happens here. The nonce is supplied by the caller, who must
//! fetch it right before calling [`TransactionBuilder::build`].

use alloy::consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::{Decodable2718, Encodable2718};
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::blockchain::wallet::Account;
use crate::config::schema::TransactionConfig;

/// An unsigned operation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub to: Address,
    /// Value in wei.
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    pub input: Bytes,
    pub nonce: u64,
    pub chain_id: ChainId,
}

impl From<PendingTransaction> for TxLegacy {
    fn from(pending: PendingTransaction) -> Self {
        TxLegacy {
            chain_id: Some(pending.chain_id.0),
            nonce: pending.nonce,
            gas_price: pending.gas_price,
            gas_limit: pending.gas_limit,
            to: TxKind::Call(pending.to),
            value: pending.value,
            input: pending.input,
        }
    }
}

/// A transaction bound to one account and one chain by its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    inner: Signed<TxLegacy>,
}

impl SignedTransaction {
    /// Decode a transaction from its EIP-2718 network encoding.
    pub fn decode(mut raw: &[u8]) -> BlockchainResult<Self> {
        match TxEnvelope::decode_2718(&mut raw)
            .map_err(|e| BlockchainError::Encoding(format!("Invalid transaction encoding: {}", e)))?
        {
            TxEnvelope::Legacy(inner) => Ok(Self { inner }),
            other => Err(BlockchainError::Encoding(format!(
                "Expected a legacy transaction, got type {:?}",
                other.tx_type()
            ))),
        }
    }

    /// Content-derived identifier (keccak256 of the signed encoding).
    pub fn hash(&self) -> TxHash {
        *self.inner.hash()
    }

    /// EIP-2718 encoding, as sent with `eth_sendRawTransaction`.
    pub fn encoded(&self) -> Bytes {
        TxEnvelope::Legacy(self.inner.clone()).encoded_2718().into()
    }

    /// Chain id the signature is bound to.
    pub fn chain_id(&self) -> Option<ChainId> {
        self.inner.tx().chain_id.map(ChainId)
    }

    /// The unsigned fields of this transaction.
    pub fn pending(&self) -> BlockchainResult<PendingTransaction> {
        let tx = self.inner.tx();
        let to = match tx.to {
            TxKind::Call(to) => to,
            TxKind::Create => {
                return Err(BlockchainError::Encoding(
                    "Contract creation transactions are not supported".to_string(),
                ))
            }
        };
        let chain_id = self.chain_id().ok_or_else(|| {
            BlockchainError::Encoding("Transaction carries no chain id".to_string())
        })?;

        Ok(PendingTransaction {
            to,
            value: tx.value,
            gas_limit: tx.gas_limit,
            gas_price: tx.gas_price,
            input: tx.input.clone(),
            nonce: tx.nonce,
            chain_id,
        })
    }

    /// Recover the address that produced the signature.
    pub fn recover_signer(&self) -> BlockchainResult<Address> {
        self.inner
            .signature()
            .recover_address_from_prehash(&self.inner.tx().signature_hash())
            .map_err(|e| BlockchainError::Wallet(format!("Signature recovery failed: {}", e)))
    }

    /// Recover the signer as if the transaction were replayed on `chain_id`.
    ///
    /// On any chain other than the signed one this yields an unrelated
    /// address (or fails), which is what rejects cross-chain replays.
    pub fn recover_signer_on(&self, chain_id: ChainId) -> BlockchainResult<Address> {
        let mut tx = self.inner.tx().clone();
        tx.chain_id = Some(chain_id.0);
        self.inner
            .signature()
            .recover_address_from_prehash(&tx.signature_hash())
            .map_err(|e| BlockchainError::Wallet(format!("Signature recovery failed: {}", e)))
    }

    /// Whether the signature verifies for `signer` on `chain_id`.
    pub fn verifies(&self, signer: Address, chain_id: ChainId) -> bool {
        self.recover_signer_on(chain_id)
            .map(|recovered| recovered == signer)
            .unwrap_or(false)
    }
}

/// Builds signed transactions for one account with fixed gas parameters.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    account: Account,
    chain_id: ChainId,
    gas_limit: u64,
    gas_price: u128,
    value: U256,
}

impl TransactionBuilder {
    /// Create a new transaction builder.
    pub fn new(account: Account, chain_id: ChainId, config: &TransactionConfig) -> Self {
        Self {
            account,
            chain_id,
            gas_limit: config.gas_limit,
            gas_price: config.gas_price_wei as u128,
            value: config.value_wei,
        }
    }

    /// Assemble the unsigned transaction for `nonce`.
    pub fn pending(&self, to: Address, input: Bytes, nonce: u64) -> PendingTransaction {
        PendingTransaction {
            to,
            value: self.value,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            input,
            nonce,
            chain_id: self.chain_id,
        }
    }

    /// Sign an already assembled transaction.
    pub fn sign(&self, pending: PendingTransaction) -> BlockchainResult<SignedTransaction> {
        let inner = self.account.sign_legacy(pending.into())?;
        let signed = SignedTransaction { inner };

        tracing::debug!(
            tx_hash = %signed.hash(),
            chain_id = self.chain_id.0,
            "Transaction signed"
        );

        Ok(signed)
    }

    /// Assemble and sign a call to `to` with payload `input` at `nonce`.
    pub fn build(&self, to: Address, input: Bytes, nonce: u64) -> BlockchainResult<SignedTransaction> {
        self.sign(self.pending(to, input, nonce))
    }

    /// Address of the signing account.
    pub fn address(&self) -> Address {
        self.account.address()
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }
}
