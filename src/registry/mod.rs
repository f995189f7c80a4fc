//! Supported-network registry.
//!
//! # Data Flow
//! ```text
//! built-in tables (networks.rs, tokens.rs)
//!     → merged with [networks] config overrides at startup
//!     → Registry (immutable for the process lifetime)
//!     → consulted by discovery, planning and execution
//! ```
//!
//! # Design Decisions
//! - Network ids are a closed enum; configuration can reshape endpoint
//!   lists for known networks but never introduce new ids
//! - RPC endpoint order is meaningful: primary first, failover follows
//! - Curated token tables are filtered at load so only EVM-shaped
//!   contract addresses survive

pub mod networks;
pub mod tokens;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::schema::NetworkOverride;

pub use tokens::{known_tokens, KnownToken};

/// Identifier of a supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// Ethereum Sepolia testnet.
    Sepolia,
    /// Ethereum mainnet.
    Ethereum,
    /// Flow EVM mainnet.
    Flow,
    /// Celo Alfajores testnet.
    Celo,
}

impl NetworkId {
    /// All supported networks, in listing order.
    pub const ALL: [NetworkId; 4] = [
        NetworkId::Sepolia,
        NetworkId::Ethereum,
        NetworkId::Flow,
        NetworkId::Celo,
    ];

    /// Lowercase identifier used in config tables and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Sepolia => "sepolia",
            NetworkId::Ethereum => "ethereum",
            NetworkId::Flow => "flow",
            NetworkId::Celo => "celo",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sepolia" => Ok(NetworkId::Sepolia),
            "ethereum" => Ok(NetworkId::Ethereum),
            "flow" => Ok(NetworkId::Flow),
            "celo" => Ok(NetworkId::Celo),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Static description of one supported network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Network identifier.
    pub id: NetworkId,
    /// Human-readable name.
    pub display_name: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Ordered RPC endpoints, primary first. Never empty.
    pub rpc_endpoints: Vec<String>,
    /// Indexer REST endpoint (module/action style), if the network has one.
    pub indexer_endpoint: Option<String>,
    /// Secondary indexer endpoint with the same contract.
    pub secondary_indexer_endpoint: Option<String>,
    /// Block explorer base URL for link rendering.
    pub block_explorer: Option<String>,
    /// Whether atomic batched execution is available on this network.
    pub atomic_execution_supported: bool,
    /// Whether the wallet-provider balance fallback may be used here.
    pub wallet_fallback_allowed: bool,
    /// Native coin name.
    pub native_name: String,
    /// Native coin symbol.
    pub native_symbol: String,
    /// Native coin decimal count.
    pub native_decimals: u8,
}

impl NetworkSpec {
    /// Chain id as the 0x-prefixed hex string wallet RPCs expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

/// Immutable registry of supported networks, built once at startup.
#[derive(Debug, Clone)]
pub struct Registry {
    networks: Vec<NetworkSpec>,
}

impl Registry {
    /// Registry with the built-in network tables only.
    pub fn builtin() -> Self {
        Self {
            networks: networks::builtin(),
        }
    }

    /// Built-in tables merged with config overrides. Override endpoints are
    /// prepended so a caller-supplied RPC becomes the primary. Unknown
    /// network ids in the override table are logged and ignored.
    pub fn with_overrides(overrides: &HashMap<String, NetworkOverride>) -> Self {
        let mut networks = networks::builtin();
        for (key, over) in overrides {
            let Ok(id) = NetworkId::from_str(key) else {
                tracing::warn!(network = %key, "Ignoring override for unknown network");
                continue;
            };
            if let Some(spec) = networks.iter_mut().find(|n| n.id == id) {
                let mut endpoints = over.rpc_endpoints.clone();
                endpoints.extend(spec.rpc_endpoints.drain(..));
                spec.rpc_endpoints = endpoints;
                if over.indexer_endpoint.is_some() {
                    spec.indexer_endpoint = over.indexer_endpoint.clone();
                }
                if over.secondary_indexer_endpoint.is_some() {
                    spec.secondary_indexer_endpoint = over.secondary_indexer_endpoint.clone();
                }
            }
        }
        Self { networks }
    }

    /// Looks up a network by id.
    pub fn get(&self, id: NetworkId) -> Option<&NetworkSpec> {
        self.networks.iter().find(|n| n.id == id)
    }

    /// All networks in listing order.
    pub fn networks(&self) -> &[NetworkSpec] {
        &self.networks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_id() {
        let registry = Registry::builtin();
        for id in NetworkId::ALL {
            let spec = registry.get(id).unwrap();
            assert!(!spec.rpc_endpoints.is_empty(), "{id} has no endpoints");
            assert_eq!(spec.id, id);
        }
    }

    #[test]
    fn test_network_id_round_trip() {
        for id in NetworkId::ALL {
            assert_eq!(NetworkId::from_str(id.as_str()).unwrap(), id);
        }
        assert!(NetworkId::from_str("solana").is_err());
    }

    #[test]
    fn test_chain_id_hex() {
        let registry = Registry::builtin();
        let sepolia = registry.get(NetworkId::Sepolia).unwrap();
        assert_eq!(sepolia.chain_id_hex(), "0xaa36a7");
    }

    #[test]
    fn test_overrides_prepend_endpoints() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "sepolia".to_string(),
            NetworkOverride {
                rpc_endpoints: vec!["http://localhost:8545".to_string()],
                indexer_endpoint: Some("http://localhost:4000/api".to_string()),
                secondary_indexer_endpoint: None,
            },
        );
        let registry = Registry::with_overrides(&overrides);
        let sepolia = registry.get(NetworkId::Sepolia).unwrap();
        assert_eq!(sepolia.rpc_endpoints[0], "http://localhost:8545");
        assert!(sepolia.rpc_endpoints.len() > 1);
        assert_eq!(
            sepolia.indexer_endpoint.as_deref(),
            Some("http://localhost:4000/api")
        );
    }

    #[test]
    fn test_unknown_override_is_ignored() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "solana".to_string(),
            NetworkOverride {
                rpc_endpoints: vec!["http://localhost:1".to_string()],
                indexer_endpoint: None,
                secondary_indexer_endpoint: None,
            },
        );
        let registry = Registry::with_overrides(&overrides);
        assert_eq!(registry.networks().len(), NetworkId::ALL.len());
    }
}
