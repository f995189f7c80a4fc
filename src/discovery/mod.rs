//! Multi-strategy token discovery.
//!
//! # Data Flow
//! ```text
//! native balance resolver (RPC failover, wallet fallback)
//!                                │
//! known-token probe ──┐          │
//! indexer REST ───────┼─ settle ─┼─→ merge by identity key
//! secondary indexer ──┘          │        │
//!                                │        ├─→ drop zero balances
//!                                └────────┴─→ native entry prepended
//! ```
//!
//! # Design Decisions
//! - Strategies run concurrently and settle independently; a failing
//!   strategy degrades coverage, it never fails the whole discovery
//! - Merge keeps first-seen ordering; a duplicate replaces the kept entry
//!   only when its normalized balance is strictly larger
//! - The native entry is always present, even at zero balance

pub mod balance;
pub mod indexer;
pub mod probe;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use futures_util::future::{join_all, BoxFuture, FutureExt};

use crate::config::schema::{DiscoveryConfig, MigratorConfig, RetryConfig};
use crate::registry::{known_tokens, NetworkSpec};
use crate::rpc::RpcClient;
use crate::token::{amount, Token, NATIVE_SENTINEL};
use crate::wallet::WalletProvider;

/// Aggregates every discovery strategy for one wallet provider.
pub struct TokenDiscovery {
    provider: Arc<dyn WalletProvider>,
    http: reqwest::Client,
    discovery: DiscoveryConfig,
    retry: RetryConfig,
}

impl TokenDiscovery {
    pub fn new(provider: Arc<dyn WalletProvider>, config: &MigratorConfig) -> Self {
        Self {
            provider,
            http: reqwest::Client::new(),
            discovery: config.discovery.clone(),
            retry: config.retry.clone(),
        }
    }

    /// Resolves the full portfolio of `holder` on one network.
    ///
    /// Never fails: each strategy absorbs its own errors, and an empty
    /// result still carries the native entry.
    pub async fn discover(&self, spec: &NetworkSpec, holder: Address) -> Vec<Token> {
        let rpc = RpcClient::for_network(spec, &self.discovery, &self.retry);

        let native_balance =
            balance::resolve_native_balance(&rpc, self.provider.as_ref(), spec, holder).await;

        let mut strategies: Vec<(&'static str, BoxFuture<'_, Vec<Token>>)> = Vec::new();

        if !known_tokens(spec.id).is_empty() {
            let probe_rpc = rpc.clone();
            let parallelism = self.discovery.probe_parallelism;
            strategies.push((
                "known-token-probe",
                async move { probe::probe_known_tokens(&probe_rpc, spec, holder, parallelism).await }
                    .boxed(),
            ));
        }
        if let Some(endpoint) = spec.indexer_endpoint.clone() {
            strategies.push(("indexer", self.indexer_strategy(endpoint, holder).boxed()));
        }
        if let Some(endpoint) = spec.secondary_indexer_endpoint.clone() {
            strategies.push((
                "secondary-indexer",
                self.indexer_strategy(endpoint, holder).boxed(),
            ));
        }

        let labels: Vec<&'static str> = strategies.iter().map(|(label, _)| *label).collect();
        let results = join_all(strategies.into_iter().map(|(_, fut)| fut)).await;

        let mut raw_count = 0usize;
        for (label, tokens) in labels.iter().zip(&results) {
            tracing::debug!(strategy = label, count = tokens.len(), "Discovery strategy settled");
            raw_count += tokens.len();
        }

        let mut merged = merge_tokens(results.into_iter().flatten());
        // Native comes from the balance resolver, never from a strategy.
        merged.retain(|t| t.contract_address != NATIVE_SENTINEL && !t.has_zero_balance());
        merged.insert(
            0,
            Token::native(
                &spec.native_name,
                &spec.native_symbol,
                spec.native_decimals,
                native_balance,
            ),
        );

        tracing::info!(
            network = %spec.id,
            holder = %holder,
            raw = raw_count,
            kept = merged.len(),
            "Discovery complete"
        );
        merged
    }

    async fn indexer_strategy(&self, endpoint: String, holder: Address) -> Vec<Token> {
        match indexer::fetch_indexer_tokens(
            &self.http,
            &endpoint,
            holder,
            self.discovery.rpc_timeout_secs,
            &self.retry,
        )
        .await
        {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Indexer strategy failed");
                Vec::new()
            }
        }
    }
}

/// Merges strategy outputs by identity key, preserving first-seen order.
/// A later duplicate wins only with a strictly larger normalized balance.
fn merge_tokens<I: IntoIterator<Item = Token>>(tokens: I) -> Vec<Token> {
    let mut kept: Vec<Token> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for token in tokens {
        let key = token.dedup_key();
        match index.get(&key) {
            Some(&i) => {
                if amount::cmp_decimal(&token.balance, &kept[i].balance) == Ordering::Greater {
                    kept[i] = token;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(token);
            }
        }
    }
    kept
}
