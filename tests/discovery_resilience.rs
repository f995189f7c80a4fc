//! Endpoint failover, rate-limit handling and multi-strategy discovery
//! against mock endpoints.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use serde_json::json;

use token_migrator::config::schema::{DiscoveryConfig, MigratorConfig, RetryConfig};
use token_migrator::discovery::balance::resolve_native_balance;
use token_migrator::discovery::probe::probe_known_tokens;
use token_migrator::discovery::TokenDiscovery;
use token_migrator::registry::{NetworkId, NetworkSpec};
use token_migrator::rpc::RpcClient;
use token_migrator::token::{TokenKind, NATIVE_SENTINEL};

mod common;
use common::{rpc_result, start_programmable_endpoint, MockWallet};

const HOLDER: &str = "0x1111111111111111111111111111111111111111";

fn holder() -> Address {
    HOLDER.parse().unwrap()
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay_ms: 50,
        max_delay_ms: 200,
    }
}

/// Spec over explicit local endpoints. Uses the Sepolia id so the probe
/// strategy walks the Sepolia curated table.
fn local_spec(rpc_endpoints: Vec<String>, indexer: Option<String>, wallet_fallback: bool) -> NetworkSpec {
    NetworkSpec {
        id: NetworkId::Sepolia,
        display_name: "Local".to_string(),
        chain_id: 11_155_111,
        rpc_endpoints,
        indexer_endpoint: indexer,
        secondary_indexer_endpoint: None,
        block_explorer: None,
        atomic_execution_supported: true,
        wallet_fallback_allowed: wallet_fallback,
        native_name: "Ether".to_string(),
        native_symbol: "ETH".to_string(),
        native_decimals: 18,
    }
}

#[tokio::test]
async fn test_failover_reaches_third_endpoint_and_skips_wallet() {
    // Nothing listens on the first two ports; the third answers.
    let live: SocketAddr = "127.0.0.1:28903".parse().unwrap();
    start_programmable_endpoint(live, |_| async {
        (200, rpc_result(json!("0xde0b6b3a7640000")))
    })
    .await;

    let spec = local_spec(
        vec![
            "http://127.0.0.1:28901".to_string(),
            "http://127.0.0.1:28902".to_string(),
            format!("http://{live}"),
        ],
        None,
        true,
    );
    let client = RpcClient::new(spec.rpc_endpoints.clone(), 2, fast_retry());
    let wallet = MockWallet::new(11_155_111);

    let balance = resolve_native_balance(&client, &wallet, &spec, holder()).await;

    assert_eq!(balance, "1");
    // The wallet is a fourth source; a successful endpoint walk must
    // never reach it.
    assert_eq!(wallet.balance_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limited_endpoint_is_retried_in_place() {
    let first: SocketAddr = "127.0.0.1:28911".parse().unwrap();
    let second: SocketAddr = "127.0.0.1:28912".parse().unwrap();

    let first_hits = Arc::new(AtomicU32::new(0));
    let hits = first_hits.clone();
    start_programmable_endpoint(first, move |_| {
        let hits = hits.clone();
        async move {
            if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                (429, "slow down".to_string())
            } else {
                (200, rpc_result(json!("0x5")))
            }
        }
    })
    .await;

    let second_hits = Arc::new(AtomicU32::new(0));
    let hits = second_hits.clone();
    start_programmable_endpoint(second, move |_| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (200, rpc_result(json!("0x9")))
        }
    })
    .await;

    let client = RpcClient::new(
        vec![format!("http://{first}"), format!("http://{second}")],
        2,
        fast_retry(),
    );

    let price = client.gas_price().await.unwrap();

    assert_eq!(price, U256::from(5u64));
    assert_eq!(first_hits.load(Ordering::SeqCst), 3);
    // The backoff happened in place; failover never advanced.
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wallet_fallback_serves_balance_when_endpoints_are_down() {
    let spec = local_spec(vec!["http://127.0.0.1:28921".to_string()], None, true);
    let client = RpcClient::new(spec.rpc_endpoints.clone(), 1, fast_retry());

    let mut wallet = MockWallet::new(1);
    wallet.balance = Some(U256::from(2_000_000_000_000_000_000u64));
    let balance = resolve_native_balance(&client, &wallet, &spec, holder()).await;

    assert_eq!(balance, "2");
    assert_eq!(wallet.balance_count.load(Ordering::SeqCst), 1);
    // The fallback switched the wallet onto the target chain first.
    assert_eq!(wallet.chain.load(Ordering::SeqCst), 11_155_111);
}

#[tokio::test]
async fn test_every_source_down_defaults_to_zero() {
    let spec = local_spec(vec!["http://127.0.0.1:28931".to_string()], None, false);
    let client = RpcClient::new(spec.rpc_endpoints.clone(), 1, fast_retry());
    let wallet = MockWallet::new(11_155_111);

    let balance = resolve_native_balance(&client, &wallet, &spec, holder()).await;

    assert_eq!(balance, "0");
    // Fallback disabled for this network: the wallet is never consulted.
    assert_eq!(wallet.balance_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_discovery_merges_strategies_and_keeps_larger_balance() {
    // USDC from the Sepolia curated table; the probe sees 0.3, the
    // indexer reports 0.5 for the same contract.
    let usdc = "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238";

    let rpc: SocketAddr = "127.0.0.1:28941".parse().unwrap();
    start_programmable_endpoint(rpc, move |request| async move {
        if request.contains("eth_getBalance") {
            return (200, rpc_result(json!("0x0")));
        }
        if request.contains("eth_getCode") {
            return (200, rpc_result(json!("0x6080604052")));
        }
        if request.contains("eth_call") {
            // balanceOf: 0.3 USDC for the curated USDC, zero otherwise.
            let word = if request.contains(usdc) { "0x493e0" } else { "0x0" };
            return (200, rpc_result(json!(word)));
        }
        (500, "unexpected method".to_string())
    })
    .await;

    let indexer: SocketAddr = "127.0.0.1:28942".parse().unwrap();
    start_programmable_endpoint(indexer, move |_| async move {
        let body = json!({
            "status": "1",
            "result": [
                {
                    "contractAddress": usdc,
                    "name": "USD Coin",
                    "symbol": "USDC",
                    "decimals": "6",
                    "balance": "500000",
                    "type": "ERC-20",
                },
                {
                    "contractAddress": "0x9999000000000000000000000000000000000009",
                    "name": "Dust",
                    "symbol": "DST",
                    "decimals": "18",
                    "balance": "0",
                    "type": "ERC-20",
                },
                {
                    "contractAddress": "0x8888000000000000000000000000000000000008",
                    "name": "Art",
                    "symbol": "ART",
                    "type": "ERC-721",
                    "tokenID": "42",
                },
            ]
        });
        (200, body.to_string())
    })
    .await;

    let spec = local_spec(
        vec![format!("http://{rpc}")],
        Some(format!("http://{indexer}/api")),
        false,
    );

    let config = MigratorConfig {
        discovery: DiscoveryConfig {
            rpc_timeout_secs: 2,
            probe_parallelism: 4,
            cache_enabled: false,
        },
        retry: fast_retry(),
        ..MigratorConfig::default()
    };
    let wallet = Arc::new(MockWallet::new(11_155_111));
    let discovery = TokenDiscovery::new(wallet, &config);

    let tokens = discovery.discover(&spec, holder()).await;

    // Native first, even at zero balance; the zero-balance fungible is
    // dropped; the duplicate USDC keeps the larger indexer balance.
    assert_eq!(tokens[0].contract_address, NATIVE_SENTINEL);
    assert_eq!(tokens[0].balance, "0");

    let usdc_entry = tokens.iter().find(|t| t.contract_address == usdc).unwrap();
    assert_eq!(usdc_entry.balance, "0.5");

    assert!(!tokens.iter().any(|t| t.symbol == "DST"));

    let nft = tokens.iter().find(|t| t.kind == TokenKind::NonFungible).unwrap();
    assert_eq!(nft.token_id.as_deref(), Some("42"));

    assert_eq!(tokens.len(), 3);
}

#[tokio::test]
async fn test_probe_walks_curated_table_with_bounded_parallelism() {
    let usdc = "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238";

    let rpc: SocketAddr = "127.0.0.1:28961".parse().unwrap();
    start_programmable_endpoint(rpc, move |request| async move {
        if request.contains("eth_getCode") {
            // Only the USDC contract is deployed; the rest of the table
            // has no bytecode and must be skipped.
            let code = if request.contains(usdc) { "0x6080604052" } else { "0x" };
            return (200, rpc_result(json!(code)));
        }
        if request.contains("eth_call") {
            return (200, rpc_result(json!("0x493e0")));
        }
        (500, "unexpected method".to_string())
    })
    .await;

    let spec = local_spec(vec![format!("http://{rpc}")], None, false);
    let client = RpcClient::new(spec.rpc_endpoints.clone(), 2, fast_retry());

    let tokens = probe_known_tokens(&client, &spec, holder(), 2).await;

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].contract_address, usdc);
    assert_eq!(tokens[0].balance, "0.3");
}

#[tokio::test]
async fn test_indexer_failure_degrades_to_other_strategies() {
    let rpc: SocketAddr = "127.0.0.1:28951".parse().unwrap();
    start_programmable_endpoint(rpc, move |request| async move {
        if request.contains("eth_getBalance") {
            return (200, rpc_result(json!("0xde0b6b3a7640000")));
        }
        if request.contains("eth_getCode") {
            return (200, rpc_result(json!("0x6080604052")));
        }
        if request.contains("eth_call") {
            return (200, rpc_result(json!("0xf4240")));
        }
        (500, "unexpected method".to_string())
    })
    .await;

    // The indexer port has no listener; the strategy fails in isolation.
    let spec = local_spec(
        vec![format!("http://{rpc}")],
        Some("http://127.0.0.1:28952/api".to_string()),
        false,
    );

    let config = MigratorConfig {
        discovery: DiscoveryConfig {
            rpc_timeout_secs: 2,
            probe_parallelism: 2,
            cache_enabled: false,
        },
        retry: fast_retry(),
        ..MigratorConfig::default()
    };
    let wallet = Arc::new(MockWallet::new(11_155_111));
    let discovery = TokenDiscovery::new(wallet, &config);

    let tokens = discovery.discover(&spec, holder()).await;

    assert_eq!(tokens[0].contract_address, NATIVE_SENTINEL);
    assert_eq!(tokens[0].balance, "1");
    // Every curated Sepolia token answered 1e6 units from the probe.
    assert!(tokens.len() > 1);
    assert!(tokens.iter().skip(1).all(|t| t.kind == TokenKind::Fungible));
}
