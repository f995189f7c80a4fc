//! Shared utilities for integration testing: mock HTTP endpoints and a
//! programmable wallet provider.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use token_migrator::rpc::ChainId;
use token_migrator::wallet::{
    ProviderError, ProviderResult, TransactionRequest, TxReceipt, WalletProvider,
};

/// Start a mock endpoint that answers every request with a fixed body.
#[allow(dead_code)]
pub async fn start_mock_endpoint(addr: SocketAddr, response: &'static str) {
    start_programmable_endpoint(addr, move |_| async move { (200, response.to_string()) }).await;
}

/// Start a programmable mock endpoint. The closure receives the raw
/// request (headers and body) and decides the status and body.
#[allow(dead_code)]
pub async fn start_programmable_endpoint<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;

                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Reads one HTTP request, headers and body, off the socket. Keeps
/// reading until the Content-Length declared by the headers is satisfied
/// so body-inspecting closures always see the full payload.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

// Each suite exercises a different subset of these helpers.

/// Wraps a result value in a JSON-RPC 2.0 response body.
#[allow(dead_code)]
pub fn rpc_result(value: Value) -> String {
    json!({"jsonrpc": "2.0", "id": 1, "result": value}).to_string()
}

/// Programmable wallet provider. Behavior is driven by public fields set
/// up before the test runs; call counters record what the engine did.
pub struct MockWallet {
    /// Active chain id. `switch_chain` updates it only when
    /// `switch_applies` is set.
    pub chain: AtomicU64,
    pub switch_applies: bool,
    /// Declared capability map; `None` makes the query fail as
    /// unsupported so negotiation falls back to brand assumptions.
    pub capabilities: Option<Value>,
    /// Self-reported client version.
    pub client_version: String,
    /// Accounts the wallet exposes.
    pub accounts: Vec<Address>,
    /// Responses of the three batched submission methods. `None` rejects.
    pub send_calls_result: Option<Value>,
    pub send_bundle_result: Option<Value>,
    pub batch_result: Option<Value>,
    /// Native balance served by the wallet, when set.
    pub balance: Option<U256>,
    /// Call indices (submission order) whose receipt reports a revert.
    pub failing_calls: HashSet<usize>,
    /// When set, receipts never materialize.
    pub receipts_pending: bool,

    pub send_calls_count: AtomicUsize,
    pub send_bundle_count: AtomicUsize,
    pub batch_count: AtomicUsize,
    pub send_tx_count: AtomicUsize,
    pub balance_count: AtomicUsize,
}

impl MockWallet {
    pub fn new(chain: u64) -> Self {
        Self {
            chain: AtomicU64::new(chain),
            switch_applies: true,
            capabilities: None,
            client_version: "MetaMask/v12.0.0".to_string(),
            accounts: Vec::new(),
            send_calls_result: None,
            send_bundle_result: None,
            batch_result: None,
            balance: None,
            failing_calls: HashSet::new(),
            receipts_pending: false,
            send_calls_count: AtomicUsize::new(0),
            send_bundle_count: AtomicUsize::new(0),
            batch_count: AtomicUsize::new(0),
            send_tx_count: AtomicUsize::new(0),
            balance_count: AtomicUsize::new(0),
        }
    }

    /// Capability map declaring ready atomic batch support on `chain`.
    #[allow(dead_code)]
    pub fn ready_capabilities(chain: u64) -> Value {
        json!({
            chain.to_string(): {
                "atomicBatch": { "supported": true, "status": "ready" },
            }
        })
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn client_version(&self) -> ProviderResult<String> {
        Ok(self.client_version.clone())
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        Ok(ChainId(self.chain.load(Ordering::SeqCst)))
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()> {
        if self.switch_applies {
            self.chain.store(chain_id.0, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn capabilities(&self) -> ProviderResult<Value> {
        match &self.capabilities {
            Some(value) => Ok(value.clone()),
            None => Err(ProviderError::Unsupported("wallet_getCapabilities".to_string())),
        }
    }

    async fn send_calls(&self, _payload: Value) -> ProviderResult<Value> {
        self.send_calls_count.fetch_add(1, Ordering::SeqCst);
        self.send_calls_result
            .clone()
            .ok_or_else(|| ProviderError::Rejected("sendCalls declined".to_string()))
    }

    async fn send_bundle(&self, _payload: Value) -> ProviderResult<Value> {
        self.send_bundle_count.fetch_add(1, Ordering::SeqCst);
        self.send_bundle_result
            .clone()
            .ok_or_else(|| ProviderError::Rejected("sendBundle declined".to_string()))
    }

    async fn batch_transactions(&self, _calls: Value) -> ProviderResult<Value> {
        self.batch_count.fetch_add(1, Ordering::SeqCst);
        self.batch_result
            .clone()
            .ok_or_else(|| ProviderError::Rejected("batchTransactions declined".to_string()))
    }

    async fn get_balance(&self, _address: Address) -> ProviderResult<U256> {
        self.balance_count.fetch_add(1, Ordering::SeqCst);
        self.balance
            .ok_or_else(|| ProviderError::Rejected("balance unavailable".to_string()))
    }

    async fn gas_price(&self) -> ProviderResult<U256> {
        // 1 gwei keeps cost arithmetic easy to assert on.
        Ok(U256::from(1_000_000_000u64))
    }

    async fn send_transaction(&self, _tx: &TransactionRequest) -> ProviderResult<String> {
        let index = self.send_tx_count.fetch_add(1, Ordering::SeqCst);
        Ok(format!("0xtx{index}"))
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> ProviderResult<Option<TxReceipt>> {
        if self.receipts_pending {
            return Ok(None);
        }
        let index: usize = tx_hash
            .trim_start_matches("0xtx")
            .parse()
            .map_err(|_| ProviderError::Malformed(format!("unknown hash {tx_hash}")))?;
        Ok(Some(TxReceipt {
            success: !self.failing_calls.contains(&index),
            block_number: Some(100 + index as u64),
        }))
    }
}
