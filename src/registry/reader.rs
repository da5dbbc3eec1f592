//! Read-only registry queries.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::registry::IPreimageRegistry;

/// View calls against a deployed preimage registry.
pub struct PreimageRegistry<C> {
    client: C,
    address: Address,
}

impl<C: NetworkClient> PreimageRegistry<C> {
    pub fn new(client: C, address: Address) -> Self {
        Self { client, address }
    }

    /// Stored size of the preimage for `hash`; zero if unknown.
    pub async fn preimage_size(&self, hash: B256) -> BlockchainResult<U256> {
        let input = IPreimageRegistry::getPreimageSizeCall { hash }.abi_encode();
        let output = self.client.call(self.address, input.into()).await?;

        IPreimageRegistry::getPreimageSizeCall::abi_decode_returns(&output)
            .map_err(|e| BlockchainError::Encoding(format!("getPreimageSize output: {}", e)))
    }

    /// Full preimage bytes for `hash`.
    pub async fn preimage(&self, hash: B256) -> BlockchainResult<Bytes> {
        let size = self.preimage_size(hash).await?;
        if size.is_zero() {
            return Ok(Bytes::new());
        }

        let input = IPreimageRegistry::getPreimageCall { size, hash }.abi_encode();
        let output = self.client.call(self.address, input.into()).await?;

        IPreimageRegistry::getPreimageCall::abi_decode_returns(&output)
            .map_err(|e| BlockchainError::Encoding(format!("getPreimage output: {}", e)))
    }

    pub fn address(&self) -> Address {
        self.address
    }
}
