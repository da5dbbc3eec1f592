//! Call payload encoding.

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::Bytes;
use alloy::sol_types::SolCall;
use std::collections::HashMap;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::registry::IPreimageRegistry;

/// Name of the registry write function.
pub const ADD_PREIMAGE: &str = "addPreimage";

/// Turns a function name and arguments into calldata.
pub trait CallEncoder: Send + Sync {
    /// Fails with [`BlockchainError::Encoding`] for unknown functions or
    /// arguments that do not match the function's parameter types.
    fn encode(&self, function: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes>;
}

/// Encoder for the preimage registry ABI.
#[derive(Debug, Clone)]
pub struct RegistryEncoder {
    functions: HashMap<String, Function>,
}

impl RegistryEncoder {
    pub fn new() -> Self {
        let functions = [
            IPreimageRegistry::addPreimageCall::SIGNATURE,
            IPreimageRegistry::getPreimageSizeCall::SIGNATURE,
            IPreimageRegistry::getPreimageCall::SIGNATURE,
        ]
        .into_iter()
        .filter_map(|sig| Function::parse(sig).ok())
        .map(|f| (f.name.clone(), f))
        .collect();

        Self { functions }
    }

    /// Calldata for `addPreimage(preimage)`.
    pub fn add_preimage(&self, preimage: &[u8]) -> BlockchainResult<Bytes> {
        self.encode(ADD_PREIMAGE, &[DynSolValue::Bytes(preimage.to_vec())])
    }
}

impl Default for RegistryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CallEncoder for RegistryEncoder {
    fn encode(&self, function: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes> {
        let func = self
            .functions
            .get(function)
            .ok_or_else(|| BlockchainError::Encoding(format!("Unknown function '{}'", function)))?;

        func.abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| BlockchainError::Encoding(format!("{}: {}", func.signature(), e)))
    }
}
