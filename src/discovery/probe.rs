//! Known-token discovery by direct contract probing.

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use futures_util::StreamExt;

use crate::registry::{self, KnownToken, NetworkSpec};
use crate::rpc::client::parse_quantity;
use crate::rpc::RpcClient;
use crate::token::{amount, Token};

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
    }
}

/// Probes the network's curated token table with balance-of calls.
/// Zero balances are kept; the aggregation filter decides their fate.
/// Every per-token failure is logged and skipped, never fatal.
pub async fn probe_known_tokens(
    rpc: &RpcClient,
    spec: &NetworkSpec,
    holder: Address,
    parallelism: usize,
) -> Vec<Token> {
    let table = registry::known_tokens(spec.id);
    if table.is_empty() {
        return Vec::new();
    }

    tracing::debug!(
        network = %spec.id,
        candidates = table.len(),
        "Probing curated token table"
    );

    // Materialized up front: a lazy map closure over the table entries
    // does not satisfy the higher-ranked bound once the probe future is
    // boxed into the strategy list.
    let probes: Vec<_> = table.iter().map(|entry| probe_one(rpc, entry, holder)).collect();
    let results: Vec<Option<Token>> = futures_util::stream::iter(probes)
        .buffered(parallelism.max(1))
        .collect()
        .await;

    results.into_iter().flatten().collect()
}

/// One balance-of probe: contract existence check, then the call.
async fn probe_one(rpc: &RpcClient, entry: &KnownToken, holder: Address) -> Option<Token> {
    let contract = match Address::from_str(&entry.address) {
        Ok(address) => address,
        Err(_) => return None,
    };

    match rpc.get_code(contract).await {
        Ok(code) => {
            if code == "0x" || code == "0x0" {
                tracing::debug!(symbol = %entry.symbol, contract = %entry.address, "No bytecode at address");
                return None;
            }
        }
        Err(e) => {
            tracing::warn!(symbol = %entry.symbol, error = %e, "Code check failed");
            return None;
        }
    }

    let data = Bytes::from(IERC20::balanceOfCall { owner: holder }.abi_encode());
    let raw = match rpc.call(contract, &data).await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(symbol = %entry.symbol, error = %e, "Balance probe failed");
            return None;
        }
    };

    let wei = match parse_quantity(&serde_json::Value::String(raw)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(symbol = %entry.symbol, error = %e, "Unparseable balance word");
            return None;
        }
    };

    let balance = amount::format_units(wei, entry.decimals);
    if wei > U256::ZERO {
        tracing::debug!(symbol = %entry.symbol, balance = %balance, "Probe found balance");
    }

    Some(Token::fungible(
        &entry.address,
        &entry.name,
        &entry.symbol,
        entry.decimals,
        balance,
    ))
}
