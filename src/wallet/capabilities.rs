//! Wallet capability negotiation.
//!
//! # Responsibilities
//! - Query the standardized chain-scoped capability method
//! - Fall back to brand assumptions when the method is missing
//! - Collapse the declared shape into a readiness verdict
//!
//! # Design Decisions
//! - Brand assumptions are synthesized into the same declared shape and
//!   run through one parser, so both paths share the readiness rules
//! - Ready requires the provider to report an active batch status itself;
//!   heuristics can reach at most Supported
//! - Results are never cached; the caller re-negotiates on chain change

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::rpc::ChainId;
use crate::wallet::provider::{WalletBrand, WalletProvider};

/// Negotiated degree of atomic-execution support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomicReadiness {
    /// Batch execution is active for the current chain.
    Ready,
    /// The wallet is capable but has not activated batching.
    Supported,
    /// No atomic support.
    Unsupported,
}

/// Capability snapshot for one (provider, chain) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCapabilities {
    /// Atomic multi-call execution is available.
    pub supports_atomic_batch: bool,
    /// Some batching method is available.
    pub supports_batching_transaction: bool,
    /// Fee sponsorship is available.
    pub supports_fee_sponsorship: bool,
    /// Readiness verdict.
    pub readiness: AtomicReadiness,
    /// Brand the negotiation resolved, for diagnostics.
    pub brand: WalletBrand,
}

impl WalletCapabilities {
    /// Conservative all-off snapshot.
    pub fn unsupported(brand: WalletBrand) -> Self {
        Self {
            supports_atomic_batch: false,
            supports_batching_transaction: false,
            supports_fee_sponsorship: false,
            readiness: AtomicReadiness::Unsupported,
            brand,
        }
    }

    /// Whether the execution engine may attempt atomic submission.
    pub fn allows_atomic(&self) -> bool {
        !matches!(self.readiness, AtomicReadiness::Unsupported)
    }
}

/// Negotiates capabilities for the given chain. Never fails: a provider
/// without the capability method degrades to brand assumptions, and an
/// unrecognized brand degrades to the all-off snapshot.
pub async fn negotiate(provider: &dyn WalletProvider, chain_id: ChainId) -> WalletCapabilities {
    let brand = match provider.client_version().await {
        Ok(version) => WalletBrand::from_client_version(&version),
        Err(e) => {
            tracing::debug!(error = %e, "Client version query failed");
            WalletBrand::Unknown
        }
    };

    let declared = match provider.capabilities().await {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(
                error = %e,
                brand = %brand,
                chain_id = %chain_id,
                "Capability query failed, assuming brand capabilities"
            );
            assumed_capabilities(brand, chain_id)
        }
    };

    let capabilities = parse_capabilities(&declared, chain_id, brand);
    tracing::info!(
        chain_id = %chain_id,
        brand = %brand,
        readiness = ?capabilities.readiness,
        "Wallet capabilities negotiated"
    );
    capabilities
}

/// Capability map assumed for a brand when the wallet exposes no
/// capability method.
fn assumed_capabilities(brand: WalletBrand, chain_id: ChainId) -> Value {
    let (atomic, sponsorship) = match brand {
        WalletBrand::MetaMask => (true, false),
        WalletBrand::Ambire => (true, true),
        WalletBrand::Unknown => (false, false),
    };
    json!({
        chain_id.to_string(): {
            "atomicBatch": { "supported": atomic },
            "paymasterService": { "supported": sponsorship },
        }
    })
}

/// Collapses a declared capability map into the snapshot for one chain.
/// The chain entry may be keyed by decimal or hex chain id; several field
/// spellings are tolerated.
fn parse_capabilities(declared: &Value, chain_id: ChainId, brand: WalletBrand) -> WalletCapabilities {
    let empty = json!({});
    let entry = declared
        .get(chain_id.to_string())
        .or_else(|| declared.get(chain_id.as_hex()))
        .unwrap_or(&empty);

    let flag = |outer: &str, inner: &str| -> bool {
        entry
            .get(outer)
            .and_then(|v| v.get(inner))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };

    let supports_atomic_batch =
        flag("atomicBatch", "supported") || flag("eip7702", "supported") || brand == WalletBrand::Ambire;
    let supports_batching_transaction =
        flag("atomicBatch", "supported") || flag("batchTransactions", "supported") || supports_atomic_batch;
    let supports_fee_sponsorship =
        flag("paymasterService", "supported") || flag("paymaster", "supported");

    let readiness = if supports_batching_transaction {
        let status = entry
            .get("atomicBatch")
            .and_then(|v| v.get("status"))
            .and_then(Value::as_str);
        if status == Some("ready") {
            AtomicReadiness::Ready
        } else {
            AtomicReadiness::Supported
        }
    } else {
        AtomicReadiness::Unsupported
    };

    WalletCapabilities {
        supports_atomic_batch,
        supports_batching_transaction,
        supports_fee_sponsorship,
        readiness,
        brand,
    }
}
