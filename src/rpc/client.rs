//! Direct JSON-RPC client with ordered endpoint failover.
//!
//! # Responsibilities
//! - Issue JSON-RPC 2.0 requests against a network's endpoint list
//! - Walk endpoints in order: primary first, failover on any failure
//! - Bound every attempt with the configured timeout
//! - Retry HTTP 429 in place with exponential backoff before advancing
//!
//! # Design Decisions
//! - Failover is strictly sequential; an endpoint is only contacted after
//!   every earlier endpoint has failed
//! - A timeout counts as that endpoint failing, it is never retried in place
//! - The caller sees a single error only when the whole list is exhausted

use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::config::schema::{DiscoveryConfig, RetryConfig};
use crate::registry::NetworkSpec;
use crate::resilience::backoff::retry_delay;
use crate::rpc::types::{RpcError, RpcResult};

/// JSON-RPC client over one network's ordered endpoint list.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
    timeout_secs: u64,
    retry: RetryConfig,
}

impl RpcClient {
    /// Client for one network, taking the endpoint order from the registry.
    pub fn for_network(spec: &NetworkSpec, discovery: &DiscoveryConfig, retry: &RetryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints: spec.rpc_endpoints.clone(),
            timeout_secs: discovery.rpc_timeout_secs,
            retry: retry.clone(),
        }
    }

    /// Client over an explicit endpoint list.
    pub fn new(endpoints: Vec<String>, timeout_secs: u64, retry: RetryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            timeout_secs,
            retry,
        }
    }

    /// The endpoint list this client walks, in order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Issues one JSON-RPC request, walking the endpoint list in order
    /// until a response arrives.
    pub async fn request(&self, method: &str, params: Value) -> RpcResult<Value> {
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            match self.call_endpoint(endpoint, method, params.clone()).await {
                Ok(result) => {
                    if i > 0 {
                        tracing::debug!(method, endpoint_idx = i, "RPC succeeded after failover");
                    }
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        method,
                        endpoint = %endpoint,
                        endpoint_idx = i,
                        error = %e,
                        "RPC endpoint failed"
                    );
                }
            }
        }
        Err(RpcError::AllEndpointsFailed {
            method: method.to_string(),
        })
    }

    /// One endpoint, with the in-place rate-limit retry loop.
    async fn call_endpoint(&self, endpoint: &str, method: &str, params: Value) -> RpcResult<Value> {
        let mut attempt = 1;
        loop {
            let fut = self.post(endpoint, method, params.clone());
            match timeout(Duration::from_secs(self.timeout_secs), fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(RpcError::RateLimited)) if attempt < self.retry.max_attempts => {
                    let delay = retry_delay(attempt, &self.retry);
                    tracing::debug!(
                        method,
                        endpoint = %endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(RpcError::Timeout(self.timeout_secs)),
            }
        }
    }

    /// A single JSON-RPC 2.0 POST with response unwrapping.
    async fn post(&self, endpoint: &str, method: &str, params: Value) -> RpcResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(RpcError::RateLimited);
        }
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if let Some(error) = payload.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(RpcError::Rpc(message.to_string()));
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::Malformed("missing result field".to_string()))
    }

    /// Native balance of an address, in wei.
    pub async fn get_balance(&self, address: Address) -> RpcResult<U256> {
        let result = self.request("eth_getBalance", json!([address, "latest"])).await?;
        parse_quantity(&result)
    }

    /// Current gas price, in wei.
    pub async fn gas_price(&self) -> RpcResult<U256> {
        let result = self.request("eth_gasPrice", json!([])).await?;
        parse_quantity(&result)
    }

    /// Raw eth_call against a contract, returning the hex-encoded output.
    pub async fn call(&self, to: Address, data: &Bytes) -> RpcResult<String> {
        let result = self
            .request("eth_call", json!([{"to": to, "data": data}, "latest"]))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed("eth_call result is not a string".to_string()))
    }

    /// Deployed bytecode at an address. `"0x"` means no contract.
    pub async fn get_code(&self, address: Address) -> RpcResult<String> {
        let result = self.request("eth_getCode", json!([address, "latest"])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed("eth_getCode result is not a string".to_string()))
    }
}

/// Parses a JSON-RPC hex quantity (`"0x..."`) into a U256.
pub fn parse_quantity(value: &Value) -> RpcResult<U256> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::Malformed(format!("expected hex quantity, got {value}")))?;
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    if digits.is_empty() {
        return Err(RpcError::Malformed("empty hex quantity".to_string()));
    }
    U256::from_str_radix(digits, 16).map_err(|_| RpcError::Malformed(format!("bad hex quantity: {text}")))
}
