//! Migration session.
//!
//! # Responsibilities
//! - Own the wallet provider, registry and configuration for one sitting
//! - Cache discovery per (network, holder) with explicit refresh
//! - Route flagged-token selections through the caller's confirmation gate
//! - Enforce one in-flight execution at a time
//!
//! # Design Decisions
//! - Session state is threaded, not global: every call receives what it
//!   needs from this value, and chain changes rebuild rather than mutate
//! - Planning is side-effect free and is not single-flighted; only
//!   execution takes the in-flight guard

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::bundle::{plan_bundle, Bundle, PlanError};
use crate::config::MigratorConfig;
use crate::discovery::TokenDiscovery;
use crate::exec::{ExecutionEngine, ExecutionError, ExecutionReport};
use crate::registry::{NetworkId, NetworkSpec, Registry};
use crate::rpc::RpcClient;
use crate::token::Token;
use crate::wallet::{ProviderError, WalletProvider};

/// Yes/no decision the session requests from its caller before moving
/// classifier-flagged tokens.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that approves every prompt.
pub struct AutoApprove;

#[async_trait]
impl ConfirmationGate for AutoApprove {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Failures surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("wallet provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("declined at the confirmation gate")]
    GateDeclined,

    #[error("another execution is in flight")]
    ExecutionInProgress,
}

/// One wallet sitting: discovery, planning and execution share this value.
pub struct MigrationSession {
    provider: Arc<dyn WalletProvider>,
    registry: Registry,
    config: MigratorConfig,
    discovery: TokenDiscovery,
    engine: ExecutionEngine,
    cache: DashMap<(NetworkId, Address), Vec<Token>>,
    in_flight: AtomicBool,
    cancel: AtomicBool,
}

impl MigrationSession {
    pub fn new(provider: Arc<dyn WalletProvider>, config: MigratorConfig) -> Self {
        let registry = Registry::with_overrides(&config.networks);
        let discovery = TokenDiscovery::new(provider.clone(), &config);
        let engine = ExecutionEngine::new(provider.clone(), config.execution.clone());
        Self {
            provider,
            registry,
            config,
            discovery,
            engine,
            cache: DashMap::new(),
            in_flight: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
        }
    }

    /// The session's network registry, overrides applied.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Accounts the wallet currently exposes.
    pub async fn accounts(&self) -> Result<Vec<Address>, SessionError> {
        Ok(self.provider.accounts().await?)
    }

    /// Portfolio of `holder` on one network, served from cache unless
    /// `refresh` is set or caching is disabled.
    pub async fn discover(
        &self,
        network: NetworkId,
        holder: Address,
        refresh: bool,
    ) -> Result<Vec<Token>, SessionError> {
        let spec = self.spec(network)?;
        let key = (network, holder);

        if !refresh && self.config.discovery.cache_enabled {
            if let Some(cached) = self.cache.get(&key) {
                tracing::debug!(network = %network, holder = %holder, "Serving cached discovery");
                return Ok(cached.clone());
            }
        }

        let tokens = self.discovery.discover(spec, holder).await;
        if self.config.discovery.cache_enabled {
            self.cache.insert(key, tokens.clone());
        }
        Ok(tokens)
    }

    /// Validates and prices a transfer request. Selections carrying
    /// classifier-flagged tokens must pass the confirmation gate first.
    pub async fn prepare(
        &self,
        network: NetworkId,
        from: &str,
        to: &str,
        selection: &[Token],
        gate: &dyn ConfirmationGate,
    ) -> Result<Bundle, SessionError> {
        let spec = self.spec(network)?;

        if let Some(prompt) = flagged_prompt(selection) {
            if !gate.confirm(&prompt).await {
                tracing::info!(network = %network, "Caller declined the flagged-token transfer");
                return Err(SessionError::GateDeclined);
            }
        }

        let rpc = RpcClient::for_network(spec, &self.config.discovery, &self.config.retry);
        let bundle = plan_bundle(
            self.provider.as_ref(),
            &rpc,
            spec,
            from,
            to,
            selection,
            &self.config.execution,
        )
        .await?;
        Ok(bundle)
    }

    /// Executes a prepared bundle. At most one execution runs at a time;
    /// a second call while one is in flight fails immediately.
    pub async fn execute(&self, bundle: &Bundle) -> Result<ExecutionReport, SessionError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SessionError::ExecutionInProgress);
        }
        self.cancel.store(false, Ordering::SeqCst);

        let result = self.engine.execute(bundle, &self.cancel).await;
        self.in_flight.store(false, Ordering::SeqCst);
        Ok(result?)
    }

    /// Requests cancellation of the in-flight execution. Honored only
    /// while nothing has been submitted yet.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn spec(&self, network: NetworkId) -> Result<&NetworkSpec, SessionError> {
        self.registry
            .get(network)
            .ok_or_else(|| SessionError::UnknownNetwork(network.to_string()))
    }
}

/// Prompt text for a selection that includes flagged tokens, if any.
fn flagged_prompt(selection: &[Token]) -> Option<String> {
    let flagged: Vec<&str> = selection
        .iter()
        .filter(|t| t.scam.is_some())
        .map(|t| t.symbol.as_str())
        .collect();
    if flagged.is_empty() {
        return None;
    }
    Some(format!(
        "Selection includes {} flagged token(s): {}. Proceed?",
        flagged.len(),
        flagged.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ScamAnnotation;

    #[test]
    fn test_clean_selection_needs_no_gate() {
        let selection = vec![Token::native("Ether", "ETH", 18, "1".to_string())];
        assert!(flagged_prompt(&selection).is_none());
    }

    #[test]
    fn test_flagged_selection_lists_symbols() {
        let mut suspicious = Token::fungible(
            "0xaaa0000000000000000000000000000000000001",
            "Free Money",
            "FREE",
            18,
            "1000000".to_string(),
        );
        suspicious.scam = Some(ScamAnnotation {
            reason: "duplicate symbol".to_string(),
        });
        let clean = Token::native("Ether", "ETH", 18, "1".to_string());

        let prompt = flagged_prompt(&[clean, suspicious]).unwrap();
        assert!(prompt.contains("1 flagged"));
        assert!(prompt.contains("FREE"));
    }

    #[tokio::test]
    async fn test_auto_approve_gate() {
        assert!(AutoApprove.confirm("anything").await);
    }
}
