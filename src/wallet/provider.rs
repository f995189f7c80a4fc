//! Wallet provider boundary.
//!
//! The signing agent is external: it holds the keys, owns the active
//! account and chain, and is driven entirely through this trait. The
//! engine never sees a private key.

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rpc::ChainId;

/// Errors surfaced by a wallet provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not implement the requested method.
    #[error("method not supported: {0}")]
    Unsupported(String),

    /// The provider understood the request and refused it.
    #[error("provider rejected request: {0}")]
    Rejected(String),

    /// The provider did not answer within the deadline.
    #[error("provider request timed out after {0}s")]
    Timeout(u64),

    /// Connection or body transfer failed.
    #[error("provider transport error: {0}")]
    Transport(String),

    /// Response did not have the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Result alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Recognized wallet identities, resolved from the provider's
/// self-reported client version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletBrand {
    MetaMask,
    Ambire,
    Unknown,
}

impl WalletBrand {
    /// Brand detection by substring over the client version string.
    pub fn from_client_version(version: &str) -> Self {
        let version = version.to_lowercase();
        if version.contains("metamask") {
            WalletBrand::MetaMask
        } else if version.contains("ambire") {
            WalletBrand::Ambire
        } else {
            WalletBrand::Unknown
        }
    }
}

impl std::fmt::Display for WalletBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WalletBrand::MetaMask => "metamask",
            WalletBrand::Ambire => "ambire",
            WalletBrand::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A single transaction handed to the wallet for signing and submission.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    /// Sender account (must be held by the wallet).
    pub from: Address,
    /// Destination address.
    pub to: Address,
    /// Value in wei.
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
    /// Gas limit, as a hex quantity on the wire.
    pub gas: U256,
}

/// Minimal transaction receipt view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Whether the transaction succeeded on chain.
    pub success: bool,
    /// Block the transaction landed in, when reported.
    pub block_number: Option<u64>,
}

/// The wallet RPC surface the engine consumes.
///
/// Object-safe so sessions can hold `Arc<dyn WalletProvider>`; tests
/// substitute programmable implementations.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Self-reported client version string, used for brand detection.
    async fn client_version(&self) -> ProviderResult<String>;

    /// Currently active chain.
    async fn chain_id(&self) -> ProviderResult<ChainId>;

    /// Accounts the wallet exposes.
    async fn accounts(&self) -> ProviderResult<Vec<Address>>;

    /// Asks the wallet to switch its active chain.
    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()>;

    /// Declared capabilities, keyed by chain id. Raw shape; parsing is the
    /// negotiator's job.
    async fn capabilities(&self) -> ProviderResult<Value>;

    /// Standardized multi-call submission.
    async fn send_calls(&self, payload: Value) -> ProviderResult<Value>;

    /// Bundle submission.
    async fn send_bundle(&self, payload: Value) -> ProviderResult<Value>;

    /// Provider-specific batching method. `calls` is the call array.
    async fn batch_transactions(&self, calls: Value) -> ProviderResult<Value>;

    /// Native balance of an address, in wei.
    async fn get_balance(&self, address: Address) -> ProviderResult<U256>;

    /// Current gas price, in wei.
    async fn gas_price(&self) -> ProviderResult<U256>;

    /// Signs and submits a single transaction, returning its hash.
    async fn send_transaction(&self, tx: &TransactionRequest) -> ProviderResult<String>;

    /// Receipt for a submitted transaction, `None` while pending.
    async fn transaction_receipt(&self, tx_hash: &str) -> ProviderResult<Option<TxReceipt>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_detection() {
        assert_eq!(
            WalletBrand::from_client_version("MetaMask/v11.16.0"),
            WalletBrand::MetaMask
        );
        assert_eq!(
            WalletBrand::from_client_version("Ambire/4.0.0"),
            WalletBrand::Ambire
        );
        assert_eq!(
            WalletBrand::from_client_version("Geth/v1.13.14-stable"),
            WalletBrand::Unknown
        );
    }

    #[test]
    fn test_transaction_request_wire_shape() {
        let tx = TransactionRequest {
            from: Address::ZERO,
            to: Address::ZERO,
            value: U256::from(1u64),
            data: Bytes::new(),
            gas: U256::from(21_000u64),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["value"], "0x1");
        assert_eq!(json["gas"], "0x5208");
        assert_eq!(json["data"], "0x");
    }
}
