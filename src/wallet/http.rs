//! Wallet daemon client over JSON-RPC 2.0 / HTTP.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::config::schema::WalletConfig;
use crate::rpc::client::parse_quantity;
use crate::rpc::ChainId;
use crate::wallet::provider::{
    ProviderError, ProviderResult, TransactionRequest, TxReceipt, WalletProvider,
};

/// JSON-RPC error code for an unimplemented method.
const METHOD_NOT_FOUND: i64 = -32601;

/// Production wallet provider speaking JSON-RPC over HTTP to an external
/// wallet daemon.
#[derive(Debug, Clone)]
pub struct HttpWalletProvider {
    http: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl HttpWalletProvider {
    pub fn new(config: &WalletConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.rpc_url.clone(),
            timeout_secs: config.request_timeout_secs,
        }
    }

    /// One JSON-RPC request with timeout and error-object mapping.
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let fut = async {
            let response = self
                .http
                .post(&self.url)
                .json(&body)
                .send()
                .await
                .map_err(|e| ProviderError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Transport(format!("HTTP status {status}")));
            }

            let payload: Value = response
                .json()
                .await
                .map_err(|e| ProviderError::Transport(e.to_string()))?;

            if let Some(error) = payload.get("error") {
                let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                if code == METHOD_NOT_FOUND {
                    return Err(ProviderError::Unsupported(method.to_string()));
                }
                return Err(ProviderError::Rejected(message));
            }

            payload
                .get("result")
                .cloned()
                .ok_or_else(|| ProviderError::Malformed("missing result field".to_string()))
        };

        match timeout(Duration::from_secs(self.timeout_secs), fut).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout_secs)),
        }
    }

    fn quantity(value: &Value) -> ProviderResult<U256> {
        parse_quantity(value).map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn client_version(&self) -> ProviderResult<String> {
        let result = self.request("web3_clientVersion", json!([])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Malformed("client version is not a string".to_string()))
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        let result = self.request("eth_chainId", json!([])).await?;
        let quantity = Self::quantity(&result)?;
        let id = u64::try_from(quantity)
            .map_err(|_| ProviderError::Malformed(format!("chain id out of range: {result}")))?;
        Ok(ChainId(id))
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        let result = self.request("eth_accounts", json!([])).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| ProviderError::Malformed("accounts is not an array".to_string()))?;
        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .and_then(|s| s.parse::<Address>().ok())
                    .ok_or_else(|| ProviderError::Malformed(format!("bad account entry: {entry}")))
            })
            .collect()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()> {
        self.request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain_id.as_hex() }]),
        )
        .await?;
        Ok(())
    }

    async fn capabilities(&self) -> ProviderResult<Value> {
        self.request("wallet_getCapabilities", json!([])).await
    }

    async fn send_calls(&self, payload: Value) -> ProviderResult<Value> {
        self.request("wallet_sendCalls", json!([payload])).await
    }

    async fn send_bundle(&self, payload: Value) -> ProviderResult<Value> {
        self.request("eth_sendBundle", json!([payload])).await
    }

    async fn batch_transactions(&self, calls: Value) -> ProviderResult<Value> {
        self.request("wallet_batchTransactions", json!([calls])).await
    }

    async fn get_balance(&self, address: Address) -> ProviderResult<U256> {
        let result = self
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        Self::quantity(&result)
    }

    async fn gas_price(&self) -> ProviderResult<U256> {
        let result = self.request("eth_gasPrice", json!([])).await?;
        Self::quantity(&result)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> ProviderResult<String> {
        let result = self.request("eth_sendTransaction", json!([tx])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Malformed("transaction hash is not a string".to_string()))
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> ProviderResult<Option<TxReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_receipt(&result)?))
    }
}

/// Parses the receipt fields the engine cares about.
fn parse_receipt(value: &Value) -> ProviderResult<TxReceipt> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::Malformed("receipt has no status".to_string()))?;
    let block_number = value
        .get("blockNumber")
        .and_then(Value::as_str)
        .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok());
    Ok(TxReceipt {
        success: status == "0x1",
        block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_receipt_status() {
        let ok = json!({"status": "0x1", "blockNumber": "0x10"});
        let receipt = parse_receipt(&ok).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.block_number, Some(16));

        let reverted = json!({"status": "0x0"});
        let receipt = parse_receipt(&reverted).unwrap();
        assert!(!receipt.success);
        assert_eq!(receipt.block_number, None);

        assert!(parse_receipt(&json!({"blockNumber": "0x10"})).is_err());
    }
}
