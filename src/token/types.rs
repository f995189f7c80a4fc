//! Token domain types.

use serde::{Deserialize, Serialize};

use crate::token::amount;

/// Sentinel contract address used for the network's native coin.
pub const NATIVE_SENTINEL: &str = "0x0000000000000000000000000000000000000000";

/// The three asset kinds the engine can move.
///
/// Closed set: every component matches exhaustively on this enum, so a new
/// kind must be wired through discovery, encoding and estimation at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// The network's base coin (no contract).
    Native,
    /// Divisible contract-backed asset (ERC-20 shaped).
    Fungible,
    /// Unique contract-backed asset identified by contract + id.
    NonFungible,
}

/// Annotation produced by an external classifier. Carried verbatim;
/// this crate never sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamAnnotation {
    /// Human-readable reason the classifier flagged the token.
    pub reason: String,
}

/// A discovered asset on one network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Asset kind.
    pub kind: TokenKind,
    /// Token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Declared decimal count. `None` for non-fungible tokens.
    pub decimals: Option<u8>,
    /// Asset id, present only for non-fungible tokens.
    pub token_id: Option<String>,
    /// Lowercase contract address; [`NATIVE_SENTINEL`] for the native coin.
    pub contract_address: String,
    /// Decimal-normalized balance (raw integer / 10^decimals).
    pub balance: String,
    /// Selection flag, mutated only by the caller.
    pub selected: bool,
    /// Classifier annotation, if the external classifier flagged this token.
    pub scam: Option<ScamAnnotation>,
}

impl Token {
    /// Builds the native-coin entry for a network.
    pub fn native(name: &str, symbol: &str, decimals: u8, balance: String) -> Self {
        Self {
            kind: TokenKind::Native,
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: Some(decimals),
            token_id: None,
            contract_address: NATIVE_SENTINEL.to_string(),
            balance,
            selected: false,
            scam: None,
        }
    }

    /// Builds a fungible entry, lowercasing the contract address.
    pub fn fungible(
        contract_address: &str,
        name: &str,
        symbol: &str,
        decimals: u8,
        balance: String,
    ) -> Self {
        Self {
            kind: TokenKind::Fungible,
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: Some(decimals),
            token_id: None,
            contract_address: contract_address.to_lowercase(),
            balance,
            selected: false,
            scam: None,
        }
    }

    /// Builds a non-fungible entry, lowercasing the contract address.
    pub fn non_fungible(contract_address: &str, name: &str, symbol: &str, token_id: &str) -> Self {
        Self {
            kind: TokenKind::NonFungible,
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: None,
            token_id: Some(token_id.to_string()),
            contract_address: contract_address.to_lowercase(),
            // A held NFT is always exactly one unit.
            balance: "1".to_string(),
            selected: false,
            scam: None,
        }
    }

    /// Identity key used for aggregation. Case-insensitive contract address,
    /// extended with the token id for non-fungible assets.
    pub fn dedup_key(&self) -> String {
        match self.kind {
            TokenKind::NonFungible => format!(
                "{}-{}",
                self.contract_address,
                self.token_id.as_deref().unwrap_or_default()
            ),
            _ => self.contract_address.clone(),
        }
    }

    /// True when the normalized balance is numerically zero.
    pub fn has_zero_balance(&self) -> bool {
        amount::is_zero(&self.balance)
    }
}
