//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an upload.
//! All types derive Serde traits for deserialization from config files.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Address of the preimage registry precompile on the devnet.
pub const DEFAULT_REGISTRY_ADDRESS: &str = "0xcc00000000000000000000000000000000000002";

/// Root configuration for the uploader.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UploadConfig {
    /// RPC endpoint and chain settings.
    pub network: NetworkConfig,

    /// Fixed transaction parameters.
    pub transaction: TransactionConfig,

    /// Receipt polling settings.
    pub confirmation: ConfirmationConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, used for reads only.
    pub failover_urls: Vec<String>,

    /// Chain ID bound into every signature (901 for the OP devnet).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:9545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 901,
            rpc_timeout_secs: 10,
        }
    }
}

/// Transaction parameters. Gas is fixed, never estimated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Registry contract receiving `addPreimage` calls.
    pub registry_address: String,

    /// Gas limit for every transaction.
    pub gas_limit: u64,

    /// Gas price in wei.
    pub gas_price_wei: u64,

    /// Native value attached to the call, in wei. Accepts an integer or a
    /// decimal or `0x` hex string for amounts above `u64::MAX`.
    #[serde(deserialize_with = "deserialize_wei")]
    pub value_wei: U256,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            registry_address: DEFAULT_REGISTRY_ADDRESS.to_string(),
            gas_limit: 10_000_000,
            gas_price_wei: 1_000_000_000,
            value_wei: U256::ZERO,
        }
    }
}

/// Deserialize a wei amount from a TOML integer or a numeric string.
fn deserialize_wei<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wei {
        Number(u64),
        Text(String),
    }

    match Wei::deserialize(deserializer)? {
        Wei::Number(n) => Ok(U256::from(n)),
        Wei::Text(s) => match s.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str(&s),
        }
        .map_err(serde::de::Error::custom),
    }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Seconds between receipt queries.
    pub poll_interval_secs: u64,

    /// Give up waiting after this many seconds.
    pub max_wait_secs: u64,
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_wait_secs: 600,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "preimage_upload=info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
