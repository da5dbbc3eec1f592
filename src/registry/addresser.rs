//! Content addressing for preimages.

use alloy::primitives::{keccak256, B256};

/// Derives a fixed-size identifier from arbitrary bytes.
///
/// Implementations must be deterministic and free of side effects.
pub trait ContentAddresser: Send + Sync {
    fn hash(&self, data: &[u8]) -> B256;
}

/// Flat keccak256 over the whole blob.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Addresser;

impl ContentAddresser for Keccak256Addresser {
    fn hash(&self, data: &[u8]) -> B256 {
        keccak256(data)
    }
}
