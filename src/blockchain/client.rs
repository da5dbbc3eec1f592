//! Network access for the transaction lifecycle.
//!
//! # Responsibilities
//! - Define the [`NetworkClient`] seam used by the builder and watcher
//! - Implement it over JSON-RPC with per-request timeouts
//! - Keep "receipt not found" apart from genuine RPC failures

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, NetworkConfig, ReceiptLookup,
};

/// Operations the upload flow needs from the network.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Next nonce the network expects from `address`, counting pending transactions.
    async fn next_sequence_number(&self, address: Address) -> BlockchainResult<u64>;

    /// Submit a signed transaction. Any error means it was not accepted.
    async fn broadcast(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash>;

    /// Look up the receipt for `tx_hash`.
    async fn receipt_for(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptLookup>;

    /// Execute a read-only call against the latest state.
    async fn call(&self, to: Address, input: Bytes) -> BlockchainResult<Bytes>;
}

#[async_trait]
impl<C: NetworkClient + ?Sized> NetworkClient for Arc<C> {
    async fn next_sequence_number(&self, address: Address) -> BlockchainResult<u64> {
        (**self).next_sequence_number(address).await
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        (**self).broadcast(tx).await
    }

    async fn receipt_for(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptLookup> {
        (**self).receipt_for(tx_hash).await
    }

    async fn call(&self, to: Address, input: Bytes) -> BlockchainResult<Bytes> {
        (**self).call(to, input).await
    }
}

/// JSON-RPC client with failover for reads.
#[derive(Clone)]
pub struct RpcClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: NetworkConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// No request is made; an unreachable endpoint only shows up on first use.
    pub fn new(config: NetworkConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            failovers = providers.len() - 1,
            "RPC client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

#[async_trait]
impl NetworkClient for RpcClient {
    async fn next_sequence_number(&self, address: Address) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address).pending();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get transaction count".to_string()))
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        // Primary only: a rejection here (stale nonce, funds) would repeat on
        // every endpoint, and a timeout is ambiguous about whether it landed.
        let encoded = tx.encoded();
        let fut = self.providers[0].send_raw_transaction(&encoded);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(pending)) => {
                let tx_hash = *pending.tx_hash();
                if tx_hash != tx.hash() {
                    tracing::warn!(
                        expected = %tx.hash(),
                        reported = %tx_hash,
                        "Node reported a different transaction hash"
                    );
                }
                Ok(tx_hash)
            }
            Ok(Err(e)) => Err(BlockchainError::Broadcast(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    async fn receipt_for(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptLookup> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result.into()),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get receipt".to_string()))
    }

    async fn call(&self, to: Address, input: Bytes) -> BlockchainResult<Bytes> {
        let request = TransactionRequest::default().with_to(to).with_input(input);
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.call(request.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to execute call".to_string()))
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> NetworkConfig {
        NetworkConfig {
            // Nothing listens on port 1; every request fails fast.
            rpc_url: "http://127.0.0.1:1".to_string(),
            failover_urls: Vec::new(),
            chain_id: 901,
            rpc_timeout_secs: 2,
        }
    }

    #[test]
    fn test_client_creation_is_offline() {
        let client = RpcClient::new(test_config()).unwrap();
        assert_eq!(client.config().chain_id, 901);
    }

    #[test]
    fn test_invalid_primary_url() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = RpcClient::new(config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[test]
    fn test_invalid_failover_is_skipped() {
        let mut config = test_config();
        config.failover_urls.push("::::".to_string());
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        let client = RpcClient::new(config).unwrap();
        assert_eq!(client.providers.len(), 2);
    }

    #[tokio::test]
    async fn test_rpc_failover() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());

        let client = RpcClient::new(config).unwrap();

        let result = client.get_chain_id().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("All RPC providers failed"));
    }

    #[tokio::test]
    async fn test_receipt_query_error_is_not_not_found() {
        let client = RpcClient::new(test_config()).unwrap();
        let result = client.receipt_for(TxHash::ZERO).await;
        assert!(matches!(result, Err(BlockchainError::Rpc(_))));
    }
}
