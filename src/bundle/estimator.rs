//! Gas and cost estimation for planned bundles.
//!
//! # Design Decisions
//! - Estimation budgets are separate from the encoding gas ceilings: a
//!   ceiling caps what a call may spend, a budget predicts what it will
//! - Atomic execution amortizes per-call overhead, modeled as a 10%
//!   discount on the summed budgets plus one batch overhead
//! - Price discovery falls back wallet, then the RPC endpoint list in
//!   order; the configured default keeps estimation total

use alloy::primitives::U256;
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::bundle::encode::TransferCall;
use crate::bundle::planner::ExecutionMode;
use crate::config::schema::ExecutionConfig;
use crate::registry::NetworkSpec;
use crate::resilience::first_success::first_success;
use crate::rpc::RpcClient;
use crate::token::amount;
use crate::wallet::WalletProvider;

/// Estimation budget for a bare native send.
const NATIVE_BUDGET: u64 = 21_000;
/// Estimation budget for a fungible `transfer` call.
const FUNGIBLE_BUDGET: u64 = 65_000;
/// Estimation budget for a non-fungible `transferFrom` call.
const NON_FUNGIBLE_BUDGET: u64 = 85_000;
/// Estimation budget for calldata with an unrecognized selector.
const UNKNOWN_BUDGET: u64 = 50_000;
/// Flat overhead of one atomic batch submission.
const ATOMIC_OVERHEAD: u64 = 50_000;

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Budget for one call, keyed on the calldata selector.
fn call_budget(call: &TransferCall) -> u64 {
    if call.calldata.is_empty() {
        return NATIVE_BUDGET;
    }
    match call.calldata.get(..4) {
        Some([0xa9, 0x05, 0x9c, 0xbb]) => FUNGIBLE_BUDGET,
        Some([0x23, 0xb8, 0x72, 0xdd]) => NON_FUNGIBLE_BUDGET,
        _ => UNKNOWN_BUDGET,
    }
}

/// Total gas estimate for a bundle in the given execution mode.
pub fn estimate_gas(calls: &[TransferCall], mode: ExecutionMode) -> u64 {
    let sum: u64 = calls.iter().map(call_budget).sum();
    match mode {
        // Rounded half-up, in integer arithmetic.
        ExecutionMode::Atomic => (sum * 90 + 50) / 100 + ATOMIC_OVERHEAD,
        ExecutionMode::Sequential => sum,
    }
}

/// Resolves a gas price in wei. The wallet is asked first, then the
/// network's RPC endpoints in their failover order. Never fails: when
/// every source is down the configured default applies.
pub async fn resolve_gas_price(
    provider: &dyn WalletProvider,
    rpc: &RpcClient,
    execution: &ExecutionConfig,
) -> U256 {
    let strategies: Vec<(&'static str, BoxFuture<'_, Result<U256, String>>)> = vec![
        (
            "wallet",
            async move { provider.gas_price().await.map_err(|e| e.to_string()) }.boxed(),
        ),
        (
            "rpc",
            async move { rpc.gas_price().await.map_err(|e| e.to_string()) }.boxed(),
        ),
    ];

    match first_success("gas-price", strategies).await {
        Ok(win) => {
            tracing::debug!(strategy = win.strategy, price_wei = %win.value, "Gas price resolved");
            win.value
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                default_gwei = execution.default_gas_price_gwei,
                "Every gas price source failed, using the configured default"
            );
            U256::from(execution.default_gas_price_gwei) * U256::from(WEI_PER_GWEI)
        }
    }
}

/// Cost estimate attached to a plan.
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimate {
    /// Total gas units budgeted.
    pub total_gas: u64,
    /// Gas price used, in wei.
    pub gas_price_wei: U256,
    /// Native-denominated cost, rendered at six decimal places.
    pub native_cost: String,
}

/// Prices a bundle: gas budget times the resolved gas price.
pub async fn estimate_cost(
    calls: &[TransferCall],
    mode: ExecutionMode,
    provider: &dyn WalletProvider,
    rpc: &RpcClient,
    spec: &NetworkSpec,
    execution: &ExecutionConfig,
) -> CostEstimate {
    let total_gas = estimate_gas(calls, mode);
    let gas_price_wei = resolve_gas_price(provider, rpc, execution).await;
    let cost_wei = U256::from(total_gas) * gas_price_wei;
    CostEstimate {
        total_gas,
        gas_price_wei,
        native_cost: amount::format_fixed(cost_wei, spec.native_decimals, 6),
    }
}
