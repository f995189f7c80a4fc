//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! migration engine. All types derive Serde traits for deserialization
//! from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the migration engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MigratorConfig {
    /// Wallet daemon connection settings.
    pub wallet: WalletConfig,

    /// Discovery settings.
    pub discovery: DiscoveryConfig,

    /// Retry policy for rate-limited endpoints.
    pub retry: RetryConfig,

    /// Execution settings.
    pub execution: ExecutionConfig,

    /// Per-network overrides, keyed by network id.
    pub networks: HashMap<String, NetworkOverride>,
}

/// Wallet daemon connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC URL of the wallet daemon that holds the keys.
    pub rpc_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-endpoint timeout for RPC and indexer requests, in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum concurrent balance-of probes.
    pub probe_parallelism: usize,

    /// Whether discovery results are cached per (network, address).
    pub cache_enabled: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: 5,
            probe_parallelism: 4,
            cache_enabled: true,
        }
    }
}

/// Retry policy applied when an endpoint answers 429.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempt ceiling per endpoint (first try included).
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 8_000,
        }
    }
}

/// Execution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// How long to wait for one transaction's receipt, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,

    /// Pause between consecutive sequential submissions, in milliseconds.
    pub pacing_delay_ms: u64,

    /// Gas price assumed when every price source fails, in gwei.
    pub default_gas_price_gwei: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 180,
            confirmation_poll_ms: 2_000,
            pacing_delay_ms: 1_000,
            default_gas_price_gwei: 20,
        }
    }
}

/// Endpoint overrides for one built-in network.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkOverride {
    /// Extra RPC endpoints, placed ahead of the built-in list.
    pub rpc_endpoints: Vec<String>,

    /// Replacement indexer endpoint.
    pub indexer_endpoint: Option<String>,

    /// Replacement secondary indexer endpoint.
    pub secondary_indexer_endpoint: Option<String>,
}
