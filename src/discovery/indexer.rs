//! Indexer REST discovery strategy.
//!
//! # Responsibilities
//! - Query `?module=account&action=tokenlist&address=` endpoints
//! - Tolerate the envelope variants and field aliases seen across
//!   indexer deployments
//! - Normalize raw integer balances into decimal strings
//!
//! # Design Decisions
//! - Entries that cannot be normalized are dropped one by one; a single
//!   bad row never discards the response
//! - Non-fungible rows keep a missing token id as `None`; the encoder is
//!   the place that rejects them

use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde_json::Value;
use tokio::time::timeout;

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::retry_delay;
use crate::rpc::types::{RpcError, RpcResult};
use crate::token::{amount, Token, TokenKind};

/// Fetches and normalizes one indexer's token list for `holder`.
/// HTTP 429 is retried in place under the configured policy.
pub async fn fetch_indexer_tokens(
    http: &reqwest::Client,
    endpoint: &str,
    holder: Address,
    timeout_secs: u64,
    retry: &RetryConfig,
) -> RpcResult<Vec<Token>> {
    let url = format!("{endpoint}?module=account&action=tokenlist&address={holder}");

    let mut attempt = 1;
    loop {
        let fut = get_json(http, &url);
        match timeout(Duration::from_secs(timeout_secs), fut).await {
            Ok(Ok(payload)) => return Ok(parse_token_list(&payload)),
            Ok(Err(RpcError::RateLimited)) if attempt < retry.max_attempts => {
                let delay = retry_delay(attempt, retry);
                tracing::debug!(
                    endpoint,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Indexer rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(RpcError::Timeout(timeout_secs)),
        }
    }
}

async fn get_json(http: &reqwest::Client, url: &str) -> RpcResult<Value> {
    let response = http
        .get(url)
        .header("Accept", "application/json")
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

    response
        .json()
        .await
        .map_err(|e| RpcError::Transport(e.to_string()))
}

/// Extracts token entries from the known envelope variants: a
/// status/result envelope, a bare result array, or an items array.
pub(crate) fn parse_token_list(payload: &Value) -> Vec<Token> {
    let entries = if payload.get("status").and_then(Value::as_str) == Some("1") {
        payload.get("result").and_then(Value::as_array)
    } else if let Some(result) = payload.get("result").and_then(Value::as_array) {
        Some(result)
    } else {
        payload.get("items").and_then(Value::as_array)
    };

    let Some(entries) = entries else {
        tracing::debug!("Indexer response has no recognizable token list");
        return Vec::new();
    };

    entries.iter().filter_map(normalize_entry).collect()
}

/// Field lookup that treats JSON null as absent.
fn field<'a>(entry: &'a Value, key: &str) -> Option<&'a Value> {
    entry.get(key).filter(|v| !v.is_null())
}

/// Same lookup under the nested `token` object some deployments use.
fn nested<'a>(entry: &'a Value, key: &str) -> Option<&'a Value> {
    entry
        .get("token")
        .and_then(|token| token.get(key))
        .filter(|v| !v.is_null())
}

/// Strings and numbers both count as text fields.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalizes one indexer row into the canonical token shape.
fn normalize_entry(entry: &Value) -> Option<Token> {
    let contract = field(entry, "contractAddress")
        .or_else(|| nested(entry, "address"))
        .or_else(|| field(entry, "address"))
        .and_then(text)?;

    let kind_text = field(entry, "type").or_else(|| nested(entry, "type")).and_then(text);
    let is_non_fungible = kind_text.as_deref() == Some("ERC-721")
        || field(entry, "tokenID").is_some()
        || field(entry, "token_id").is_some();

    let name = field(entry, "name")
        .or_else(|| nested(entry, "name"))
        .and_then(text)
        .unwrap_or_else(|| "Unknown Token".to_string());
    let symbol = field(entry, "symbol")
        .or_else(|| nested(entry, "symbol"))
        .and_then(text)
        .unwrap_or_else(|| "UNKNOWN".to_string());

    if is_non_fungible {
        let token_id = field(entry, "tokenID")
            .or_else(|| field(entry, "token_id"))
            .or_else(|| field(entry, "id"))
            .and_then(text);
        return Some(match token_id {
            Some(id) => Token::non_fungible(&contract, &name, &symbol, &id),
            None => Token {
                kind: TokenKind::NonFungible,
                name,
                symbol,
                decimals: None,
                token_id: None,
                contract_address: contract.to_lowercase(),
                balance: "1".to_string(),
                selected: false,
                scam: None,
            },
        });
    }

    let decimals = field(entry, "decimals")
        .or_else(|| nested(entry, "decimals"))
        .and_then(text)
        .and_then(|s| s.parse::<u8>().ok())
        .unwrap_or(18);

    let raw = field(entry, "balance").or_else(|| field(entry, "value")).and_then(text)?;
    let Ok(wei) = U256::from_str_radix(&raw, 10) else {
        tracing::debug!(contract = %contract, raw = %raw, "Unparseable raw balance, dropping entry");
        return None;
    };

    Some(Token::fungible(
        &contract,
        &name,
        &symbol,
        decimals,
        amount::format_units(wei, decimals),
    ))
}
