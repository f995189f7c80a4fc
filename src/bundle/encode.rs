//! Calldata encoding for the three transfer shapes.
//!
//! # Responsibilities
//! - Produce submission-ready calls: target, calldata, value, gas ceiling
//! - Convert decimal balances to smallest units exactly, truncating excess
//!   fractional digits
//! - Fail per token, so one unencodable asset never blocks the rest

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::Serialize;
use thiserror::Error;

use crate::token::{amount, Token, TokenKind};

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }

    interface IERC721 {
        function transferFrom(address from, address to, uint256 tokenId) external;
    }
}

/// Gas ceiling attached to a native transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;
/// Gas ceiling attached to a fungible `transfer` call.
pub const FUNGIBLE_TRANSFER_GAS: u64 = 90_000;
/// Gas ceiling attached to a non-fungible `transferFrom` call.
pub const NON_FUNGIBLE_TRANSFER_GAS: u64 = 120_000;

/// Why one token could not be encoded.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid contract address: {0}")]
    InvalidAddress(String),

    #[error("unparseable amount {balance:?} for {symbol}")]
    InvalidAmount { symbol: String, balance: String },

    #[error("amount is zero")]
    ZeroAmount,

    #[error("token id missing for non-fungible {0}")]
    MissingTokenId(String),

    #[error("token id is not an integer: {0}")]
    InvalidTokenId(String),
}

/// One encoded transfer, ready for submission.
#[derive(Debug, Clone, Serialize)]
pub struct TransferCall {
    /// Contract being called, or the recipient for native transfers.
    pub target: Address,
    /// ABI-encoded calldata. Empty for native transfers.
    pub calldata: Bytes,
    /// Native value moved with the call. Zero for contract calls.
    pub value: U256,
    /// Gas ceiling for this call shape.
    pub gas_budget: u64,
    /// Human-readable label for reports and logs.
    pub description: String,
}

/// A selected token that could not be encoded, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTransfer {
    pub symbol: String,
    pub contract_address: String,
    pub token_id: Option<String>,
    pub reason: String,
}

/// Encodes one token into the call that moves its full balance to `to`.
pub fn encode_transfer(token: &Token, from: Address, to: Address) -> Result<TransferCall, EncodeError> {
    match token.kind {
        TokenKind::Native => {
            let value = parse_amount(token)?;
            if value.is_zero() {
                return Err(EncodeError::ZeroAmount);
            }
            Ok(TransferCall {
                target: to,
                calldata: Bytes::new(),
                value,
                gas_budget: NATIVE_TRANSFER_GAS,
                description: format!("Send {} {}", token.balance, token.symbol),
            })
        }
        TokenKind::Fungible => {
            let contract = parse_address(&token.contract_address)?;
            let units = parse_amount(token)?;
            if units.is_zero() {
                return Err(EncodeError::ZeroAmount);
            }
            let calldata = IERC20::transferCall { to, amount: units }.abi_encode();
            Ok(TransferCall {
                target: contract,
                calldata: calldata.into(),
                value: U256::ZERO,
                gas_budget: FUNGIBLE_TRANSFER_GAS,
                description: format!("Transfer {} {}", token.balance, token.symbol),
            })
        }
        TokenKind::NonFungible => {
            let contract = parse_address(&token.contract_address)?;
            let id_text = token
                .token_id
                .as_deref()
                .ok_or_else(|| EncodeError::MissingTokenId(token.symbol.clone()))?;
            let token_id = parse_token_id(id_text)?;
            let calldata = IERC721::transferFromCall { from, to, tokenId: token_id }.abi_encode();
            Ok(TransferCall {
                target: contract,
                calldata: calldata.into(),
                value: U256::ZERO,
                gas_budget: NON_FUNGIBLE_TRANSFER_GAS,
                description: format!("Transfer {} #{}", token.symbol, id_text),
            })
        }
    }
}

/// Encodes a selection in order, splitting it into submittable calls and
/// per-token skip diagnostics.
pub fn encode_selection(
    tokens: &[Token],
    from: Address,
    to: Address,
) -> (Vec<TransferCall>, Vec<SkippedTransfer>) {
    let mut calls = Vec::new();
    let mut skipped = Vec::new();
    for token in tokens {
        match encode_transfer(token, from, to) {
            Ok(call) => calls.push(call),
            Err(e) => {
                tracing::warn!(
                    symbol = %token.symbol,
                    contract = %token.contract_address,
                    error = %e,
                    "Skipping unencodable transfer"
                );
                skipped.push(SkippedTransfer {
                    symbol: token.symbol.clone(),
                    contract_address: token.contract_address.clone(),
                    token_id: token.token_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (calls, skipped)
}

fn parse_address(text: &str) -> Result<Address, EncodeError> {
    Address::from_str(text).map_err(|_| EncodeError::InvalidAddress(text.to_string()))
}

fn parse_amount(token: &Token) -> Result<U256, EncodeError> {
    let decimals = token.decimals.unwrap_or(18);
    amount::to_smallest_unit(&token.balance, decimals).map_err(|_| EncodeError::InvalidAmount {
        symbol: token.symbol.clone(),
        balance: token.balance.clone(),
    })
}

/// Token ids arrive as decimal or 0x-prefixed hex strings.
fn parse_token_id(text: &str) -> Result<U256, EncodeError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(text, 10),
    };
    parsed.map_err(|_| EncodeError::InvalidTokenId(text.to_string()))
}
