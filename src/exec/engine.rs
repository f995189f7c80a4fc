//! Bundle execution engine.
//!
//! # Data Flow
//! ```text
//! Bundle
//!   → chain negotiation (fail-closed)
//!   → atomic path: wallet_sendCalls → eth_sendBundle → wallet_batchTransactions
//!         first success → Confirmed, batch reference
//!         all fail      → downgrade
//!   → sequential path: submit call n → await receipt → submit call n+1
//!         on-chain failure at n → abort n+1.., Aborted report
//! ```
//!
//! # Design Decisions
//! - Atomic exhaustion is recoverable: the engine downgrades and records
//!   that it did, it never fails the bundle for that reason
//! - After the first submission attempt the engine always runs to a
//!   terminal report with one recorded outcome per call
//! - The canonical execution reference is the batch identifier or the
//!   first accepted transaction hash

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};
use tokio::time::{interval, timeout};

use crate::bundle::{Bundle, ExecutionMode};
use crate::config::schema::ExecutionConfig;
use crate::exec::chain::ensure_chain;
use crate::exec::types::{
    CallOutcome, CallStatus, ExecutionError, ExecutionReport, ExecutionState, StepFailure,
};
use crate::resilience::first_success::{first_success, ExhaustedStrategies, FirstSuccess};
use crate::rpc::ChainId;
use crate::wallet::{ProviderError, TransactionRequest, WalletProvider};

/// Drives planned bundles to a terminal state through the wallet provider.
pub struct ExecutionEngine {
    provider: Arc<dyn WalletProvider>,
    execution: ExecutionConfig,
}

impl ExecutionEngine {
    pub fn new(provider: Arc<dyn WalletProvider>, execution: ExecutionConfig) -> Self {
        Self { provider, execution }
    }

    /// Executes one bundle.
    ///
    /// Cancellation is honored up to the first submission attempt. From
    /// then on the bundle runs to Confirmed or Aborted; the remainder is
    /// never silently dropped.
    pub async fn execute(
        &self,
        bundle: &Bundle,
        cancel: &AtomicBool,
    ) -> Result<ExecutionReport, ExecutionError> {
        let mut state = ExecutionState::Planned;

        if cancel.load(Ordering::SeqCst) {
            return Err(ExecutionError::Cancelled);
        }

        transition(bundle, &mut state, ExecutionState::NegotiatingChain);
        ensure_chain(self.provider.as_ref(), ChainId(bundle.chain_id)).await?;

        if cancel.load(Ordering::SeqCst) {
            return Err(ExecutionError::Cancelled);
        }

        let mut downgraded = false;
        if bundle.mode == ExecutionMode::Atomic {
            transition(bundle, &mut state, ExecutionState::SubmittingAtomic);
            match self.submit_atomic(bundle).await {
                Ok(win) => {
                    transition(bundle, &mut state, ExecutionState::Confirmed);
                    tracing::info!(
                        plan_id = %bundle.plan_id,
                        method = win.strategy,
                        reference = %win.value,
                        "Atomic submission accepted"
                    );
                    return Ok(atomic_report(bundle, win));
                }
                Err(e) => {
                    tracing::warn!(
                        plan_id = %bundle.plan_id,
                        error = %e,
                        "Atomic submission exhausted, downgrading to sequential"
                    );
                    downgraded = true;
                }
            }
        }

        transition(bundle, &mut state, ExecutionState::SubmittingSequential);
        Ok(self.submit_sequential(bundle, &mut state, downgraded).await)
    }

    /// Tries the batched submission methods in their fixed order.
    async fn submit_atomic(
        &self,
        bundle: &Bundle,
    ) -> Result<FirstSuccess<String>, ExhaustedStrategies> {
        let provider = self.provider.as_ref();
        let strategies: Vec<(&'static str, BoxFuture<'_, Result<String, ProviderError>>)> = vec![
            (
                "wallet_sendCalls",
                async move {
                    provider
                        .send_calls(send_calls_payload(bundle))
                        .await
                        .map(|v| extract_reference(&v))
                }
                .boxed(),
            ),
            (
                "eth_sendBundle",
                async move {
                    provider
                        .send_bundle(bundle_payload(bundle))
                        .await
                        .map(|v| extract_reference(&v))
                }
                .boxed(),
            ),
            (
                "wallet_batchTransactions",
                async move {
                    provider
                        .batch_transactions(Value::Array(call_entries(bundle)))
                        .await
                        .map(|v| extract_reference(&v))
                }
                .boxed(),
            ),
        ];
        first_success("atomic-submission", strategies).await
    }

    /// Sends the calls one by one in plan order, each confirmed on chain
    /// before the next is submitted.
    async fn submit_sequential(
        &self,
        bundle: &Bundle,
        state: &mut ExecutionState,
        downgraded: bool,
    ) -> ExecutionReport {
        let mut outcomes = Vec::with_capacity(bundle.calls.len());
        let mut first_hash: Option<String> = None;
        let mut failure: Option<StepFailure> = None;

        for (index, call) in bundle.calls.iter().enumerate() {
            if let Some(fail) = &failure {
                tracing::debug!(
                    plan_id = %bundle.plan_id,
                    index,
                    aborted_by = fail.index,
                    "Skipping call after abort"
                );
                outcomes.push(CallOutcome {
                    index,
                    description: call.description.clone(),
                    tx_hash: None,
                    block_number: None,
                    status: CallStatus::Skipped,
                    reason: None,
                });
                continue;
            }

            if index > 0 {
                tokio::time::sleep(Duration::from_millis(self.execution.pacing_delay_ms)).await;
            }

            let tx = TransactionRequest {
                from: bundle.from,
                to: call.target,
                value: call.value,
                data: call.calldata.clone(),
                // Submission limit leaves headroom over the shape ceiling.
                gas: U256::from(call.gas_budget * 2),
            };

            let hash = match self.provider.send_transaction(&tx).await {
                Ok(hash) => hash,
                Err(e) => {
                    tracing::warn!(
                        plan_id = %bundle.plan_id,
                        index,
                        error = %e,
                        "Submission rejected, aborting remaining calls"
                    );
                    outcomes.push(CallOutcome {
                        index,
                        description: call.description.clone(),
                        tx_hash: None,
                        block_number: None,
                        status: CallStatus::Failed,
                        reason: Some(e.to_string()),
                    });
                    failure = Some(StepFailure { index, reason: e.to_string() });
                    continue;
                }
            };
            if first_hash.is_none() {
                first_hash = Some(hash.clone());
            }
            tracing::info!(
                plan_id = %bundle.plan_id,
                index,
                tx_hash = %hash,
                description = %call.description,
                "Transaction submitted"
            );

            match self.wait_for_confirmation(&hash).await {
                Ok(block_number) => {
                    outcomes.push(CallOutcome {
                        index,
                        description: call.description.clone(),
                        tx_hash: Some(hash),
                        block_number,
                        status: CallStatus::Confirmed,
                        reason: None,
                    });
                }
                Err(reason) => {
                    tracing::warn!(
                        plan_id = %bundle.plan_id,
                        index,
                        tx_hash = %hash,
                        reason = %reason,
                        "Transfer failed on chain, aborting remaining calls"
                    );
                    outcomes.push(CallOutcome {
                        index,
                        description: call.description.clone(),
                        tx_hash: Some(hash),
                        block_number: None,
                        status: CallStatus::Failed,
                        reason: Some(reason.clone()),
                    });
                    failure = Some(StepFailure { index, reason });
                }
            }
        }

        let terminal = if failure.is_none() {
            ExecutionState::Confirmed
        } else {
            ExecutionState::Aborted
        };
        transition(bundle, state, terminal);

        ExecutionReport {
            plan_id: bundle.plan_id,
            state: terminal,
            method: "sequential",
            reference: first_hash,
            downgraded,
            outcomes,
            failure,
        }
    }

    /// Polls for the receipt until it appears or the deadline passes.
    /// The observed status must be success. Transient receipt-query errors
    /// keep polling; the outer timeout bounds the wait.
    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<Option<u64>, String> {
        let deadline = Duration::from_secs(self.execution.confirmation_timeout_secs);
        let poll = Duration::from_millis(self.execution.confirmation_poll_ms);

        let result = timeout(deadline, async {
            let mut ticker = interval(poll);
            loop {
                ticker.tick().await;

                let receipt = match self.provider.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => receipt,
                    Ok(None) => {
                        tracing::debug!(tx_hash, "Transaction pending");
                        continue;
                    }
                    Err(e) => {
                        tracing::debug!(tx_hash, error = %e, "Receipt query failed");
                        continue;
                    }
                };

                if receipt.success {
                    return Ok(receipt.block_number);
                }
                return Err("transaction reverted".to_string());
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(format!(
                "no confirmation within {}s",
                self.execution.confirmation_timeout_secs
            )),
        }
    }
}

fn transition(bundle: &Bundle, state: &mut ExecutionState, next: ExecutionState) {
    tracing::debug!(plan_id = %bundle.plan_id, from = %state, to = %next, "Execution state change");
    *state = next;
}

/// Report for a batch that landed as a unit: one Confirmed outcome per
/// call, the batch identifier as the reference.
fn atomic_report(bundle: &Bundle, win: FirstSuccess<String>) -> ExecutionReport {
    let outcomes = bundle
        .calls
        .iter()
        .enumerate()
        .map(|(index, call)| CallOutcome {
            index,
            description: call.description.clone(),
            tx_hash: None,
            block_number: None,
            status: CallStatus::Confirmed,
            reason: None,
        })
        .collect();
    ExecutionReport {
        plan_id: bundle.plan_id,
        state: ExecutionState::Confirmed,
        method: win.strategy,
        reference: Some(win.value),
        downgraded: false,
        outcomes,
        failure: None,
    }
}

/// Wire entries shared by the batched submission methods.
fn call_entries(bundle: &Bundle) -> Vec<Value> {
    bundle
        .calls
        .iter()
        .map(|call| {
            json!({
                "to": call.target,
                "data": call.calldata,
                "value": call.value,
            })
        })
        .collect()
}

/// EIP-5792 style wallet_sendCalls payload.
fn send_calls_payload(bundle: &Bundle) -> Value {
    json!({
        "version": "1.0",
        "chainId": format!("0x{:x}", bundle.chain_id),
        "from": bundle.from,
        "calls": call_entries(bundle),
        "atomic": true,
    })
}

/// eth_sendBundle payload: flat transaction objects carrying the sender.
fn bundle_payload(bundle: &Bundle) -> Value {
    let transactions: Vec<Value> = bundle
        .calls
        .iter()
        .map(|call| {
            json!({
                "from": bundle.from,
                "to": call.target,
                "data": call.calldata,
                "value": call.value,
            })
        })
        .collect();
    json!({ "transactions": transactions })
}

/// Pulls the execution identifier out of a submission response. Providers
/// answer with a bare string or an object keyed `hash`, `transactionHash`
/// or `id`; the raw JSON text is the last resort.
fn extract_reference(value: &Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    for key in ["hash", "transactionHash", "id"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use alloy::primitives::Address;
    use uuid::Uuid;

    use crate::bundle::encode::encode_selection;
    use crate::bundle::CostEstimate;
    use crate::registry::NetworkId;
    use crate::token::Token;
    use crate::wallet::{WalletBrand, WalletCapabilities};

    fn sample_bundle() -> Bundle {
        let from = Address::from_str("0x1111111111111111111111111111111111111111").unwrap();
        let to = Address::from_str("0x2222222222222222222222222222222222222222").unwrap();
        let native = Token::native("Ether", "ETH", 18, "1".to_string());
        let usdc = Token::fungible(
            "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238",
            "USD Coin",
            "USDC",
            6,
            "5".to_string(),
        );
        let (calls, skipped) = encode_selection(&[native, usdc], from, to);
        Bundle {
            plan_id: Uuid::new_v4(),
            network: NetworkId::Sepolia,
            chain_id: 11_155_111,
            from,
            to,
            calls,
            skipped,
            mode: ExecutionMode::Atomic,
            estimate: CostEstimate {
                total_gas: 0,
                gas_price_wei: U256::ZERO,
                native_cost: "0.000000".to_string(),
            },
            capabilities: WalletCapabilities::unsupported(WalletBrand::Unknown),
        }
    }

    #[test]
    fn test_send_calls_payload_shape() {
        let bundle = sample_bundle();
        let payload = send_calls_payload(&bundle);

        assert_eq!(payload["version"], "1.0");
        assert_eq!(payload["chainId"], "0xaa36a7");
        assert_eq!(payload["atomic"], true);
        assert_eq!(payload["from"], json!(bundle.from));

        let calls = payload["calls"].as_array().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0]["data"], "0x");
        assert_eq!(calls[0]["value"], "0xde0b6b3a7640000");
        assert_eq!(calls[1]["value"], "0x0");
        let data = calls[1]["data"].as_str().unwrap();
        assert!(data.starts_with("0xa9059cbb"));
    }

    #[test]
    fn test_bundle_payload_carries_sender() {
        let bundle = sample_bundle();
        let payload = bundle_payload(&bundle);
        let transactions = payload["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 2);
        for tx in transactions {
            assert_eq!(tx["from"], json!(bundle.from));
        }
    }

    #[test]
    fn test_extract_reference_variants() {
        assert_eq!(extract_reference(&json!("0xabc")), "0xabc");
        assert_eq!(extract_reference(&json!({"hash": "0x1"})), "0x1");
        assert_eq!(extract_reference(&json!({"transactionHash": "0x2"})), "0x2");
        assert_eq!(extract_reference(&json!({"id": "batch-7"})), "batch-7");
        assert_eq!(extract_reference(&json!({"other": 1})), r#"{"other":1}"#);
    }

    #[test]
    fn test_atomic_report_records_every_call() {
        let bundle = sample_bundle();
        let report = atomic_report(
            &bundle,
            FirstSuccess {
                value: "0xbatch".to_string(),
                strategy: "wallet_sendCalls",
            },
        );
        assert_eq!(report.state, ExecutionState::Confirmed);
        assert_eq!(report.method, "wallet_sendCalls");
        assert_eq!(report.reference.as_deref(), Some("0xbatch"));
        assert_eq!(report.outcomes.len(), bundle.calls.len());
        assert!(report.outcomes.iter().all(|o| o.status == CallStatus::Confirmed));
        assert!(!report.downgraded);
    }
}
