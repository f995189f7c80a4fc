//! Network switch coordination.
//!
//! The wallet session's active chain is shared mutable state. Before any
//! submission the active chain must equal the target chain; a mismatch
//! gets exactly one switch request and one re-verification. Failure to
//! converge aborts the execution, nothing is ever sent on the wrong chain.

use crate::exec::types::ExecutionError;
use crate::rpc::ChainId;
use crate::wallet::WalletProvider;

/// Verifies the wallet's active chain, switching once if needed.
pub async fn ensure_chain(
    provider: &dyn WalletProvider,
    target: ChainId,
) -> Result<(), ExecutionError> {
    let active = provider
        .chain_id()
        .await
        .map_err(ExecutionError::ChainUnavailable)?;
    if active == target {
        tracing::debug!(chain_id = %target, "Wallet already on target chain");
        return Ok(());
    }

    tracing::info!(from = %active, to = %target, "Requesting wallet chain switch");
    provider
        .switch_chain(target)
        .await
        .map_err(|e| ExecutionError::SwitchDeclined(target, e))?;

    let verified = provider
        .chain_id()
        .await
        .map_err(ExecutionError::ChainUnavailable)?;
    if verified != target {
        return Err(ExecutionError::ChainMismatch {
            expected: target,
            actual: verified,
        });
    }
    Ok(())
}
