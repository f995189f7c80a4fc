//! Native-coin balance resolution.

use alloy::primitives::Address;

use crate::registry::NetworkSpec;
use crate::rpc::{ChainId, RpcClient};
use crate::token::amount;
use crate::wallet::provider::WalletProvider;

/// Resolves the native balance of `holder`, walking the network's RPC
/// endpoints in order and falling back to the wallet provider where the
/// network allows it. Returns `"0"` when every source fails; this is a
/// recoverable default and never an error.
pub async fn resolve_native_balance(
    rpc: &RpcClient,
    provider: &dyn WalletProvider,
    spec: &NetworkSpec,
    holder: Address,
) -> String {
    match rpc.get_balance(holder).await {
        Ok(wei) => return amount::format_units(wei, spec.native_decimals),
        Err(e) => {
            tracing::warn!(
                network = %spec.id,
                holder = %holder,
                error = %e,
                "Native balance unavailable from RPC endpoints"
            );
        }
    }

    if spec.wallet_fallback_allowed {
        // Best effort: the wallet may be parked on another chain. A failed
        // switch is ignored, the balance query decides.
        if let Err(e) = provider.switch_chain(ChainId(spec.chain_id)).await {
            tracing::debug!(network = %spec.id, error = %e, "Chain switch before balance fallback failed");
        }
        match provider.get_balance(holder).await {
            Ok(wei) => {
                tracing::debug!(network = %spec.id, "Native balance served by wallet provider");
                return amount::format_units(wei, spec.native_decimals);
            }
            Err(e) => {
                tracing::warn!(
                    network = %spec.id,
                    error = %e,
                    "Wallet provider balance fallback failed"
                );
            }
        }
    }

    "0".to_string()
}
