//! Bundle planning and validation.
//!
//! # Data Flow
//! ```text
//! selection + from/to
//!     → request validation (distinct, well-formed, non-empty)
//!     → capability negotiation (fresh per plan, never cached)
//!     → execution mode decision (network gate AND wallet gate)
//!     → ordered encoding with per-token skips
//!     → gas and cost estimation
//!     → Bundle
//! ```
//!
//! # Design Decisions
//! - Encoding is independent of the negotiated mode; the same calls are
//!   submitted atomically or one by one
//! - Calls keep the selection order, so reports line up with what the
//!   caller picked

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::bundle::encode::{encode_selection, SkippedTransfer, TransferCall};
use crate::bundle::estimator::{estimate_cost, CostEstimate};
use crate::config::schema::ExecutionConfig;
use crate::registry::{NetworkId, NetworkSpec};
use crate::rpc::{ChainId, RpcClient};
use crate::token::Token;
use crate::wallet::{negotiate, WalletCapabilities, WalletProvider};

/// How a planned bundle will be driven on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One batched submission that lands or fails as a unit.
    Atomic,
    /// One transaction per call, each confirmed before the next.
    Sequential,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionMode::Atomic => "atomic",
            ExecutionMode::Sequential => "sequential",
        })
    }
}

/// Why a bundle could not be planned.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("source and destination are the same address")]
    SameAddress,

    #[error("{field} address is malformed: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("selection is empty")]
    EmptySelection,

    #[error("nothing to transfer: every selected token was skipped")]
    NothingToTransfer { skipped: Vec<SkippedTransfer> },
}

/// A fully prepared transfer bundle, ready for execution.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    /// Identifier threaded through logs and the execution report.
    pub plan_id: Uuid,
    /// Network the bundle targets.
    pub network: NetworkId,
    /// EVM chain id of that network.
    pub chain_id: u64,
    /// Sending address.
    pub from: Address,
    /// Receiving address.
    pub to: Address,
    /// Encoded calls, in selection order.
    pub calls: Vec<TransferCall>,
    /// Selected tokens that could not be encoded.
    pub skipped: Vec<SkippedTransfer>,
    /// Negotiated execution mode.
    pub mode: ExecutionMode,
    /// Gas and cost estimate for the negotiated mode.
    pub estimate: CostEstimate,
    /// Capability snapshot taken when this bundle was planned.
    pub capabilities: WalletCapabilities,
}

/// Validates and prices a transfer request into an executable bundle.
pub async fn plan_bundle(
    provider: &dyn WalletProvider,
    rpc: &RpcClient,
    spec: &NetworkSpec,
    from: &str,
    to: &str,
    selection: &[Token],
    execution: &ExecutionConfig,
) -> Result<Bundle, PlanError> {
    let (from, to) = validate_request(from, to, selection)?;

    // Renegotiated on every plan; a capability snapshot never outlives
    // the chain it was taken on.
    let capabilities = negotiate(provider, ChainId(spec.chain_id)).await;
    let mode = decide_mode(spec, &capabilities);

    let (calls, skipped) = encode_selection(selection, from, to);
    if calls.is_empty() {
        return Err(PlanError::NothingToTransfer { skipped });
    }

    let estimate = estimate_cost(&calls, mode, provider, rpc, spec, execution).await;

    let bundle = Bundle {
        plan_id: Uuid::new_v4(),
        network: spec.id,
        chain_id: spec.chain_id,
        from,
        to,
        calls,
        skipped,
        mode,
        estimate,
        capabilities,
    };
    tracing::info!(
        plan_id = %bundle.plan_id,
        network = %bundle.network,
        mode = %bundle.mode,
        calls = bundle.calls.len(),
        skipped = bundle.skipped.len(),
        total_gas = bundle.estimate.total_gas,
        "Bundle planned"
    );
    Ok(bundle)
}

fn validate_request(
    from: &str,
    to: &str,
    selection: &[Token],
) -> Result<(Address, Address), PlanError> {
    let from = Address::from_str(from).map_err(|_| PlanError::InvalidAddress {
        field: "from",
        value: from.to_string(),
    })?;
    let to = Address::from_str(to).map_err(|_| PlanError::InvalidAddress {
        field: "to",
        value: to.to_string(),
    })?;
    if from == to {
        return Err(PlanError::SameAddress);
    }
    if selection.is_empty() {
        return Err(PlanError::EmptySelection);
    }
    Ok((from, to))
}

/// Atomic only when the network supports it AND the wallet reports it.
fn decide_mode(spec: &NetworkSpec, capabilities: &WalletCapabilities) -> ExecutionMode {
    if spec.atomic_execution_supported && capabilities.allows_atomic() {
        ExecutionMode::Atomic
    } else {
        ExecutionMode::Sequential
    }
}
