//! Curated token tables used by the direct-probing discovery strategy.

use std::collections::HashMap;
use std::str::FromStr;

use alloy::primitives::Address;
use once_cell::sync::Lazy;

use super::NetworkId;

/// A curated token contract worth probing directly.
#[derive(Debug, Clone)]
pub struct KnownToken {
    /// Lowercase contract address.
    pub address: String,
    /// Token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Declared decimal count.
    pub decimals: u8,
}

/// Raw table entries: (address, name, symbol, decimals). Entries whose
/// address is not a parseable EVM address (some upstream lists carry
/// chain-native identifiers) are dropped when the table is built.
const SEPOLIA: &[(&str, &str, &str, u8)] = &[
    (
        "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238",
        "USD Coin (Sepolia)",
        "USDC",
        6,
    ),
    (
        "0xfff9976782d46cc05630d1f6ebab18b2324d6b14",
        "Wrapped Ether (Sepolia)",
        "WETH",
        18,
    ),
    (
        "0x3e622317f8c93f7328350cf0b56d9ed4c620c5d6",
        "Dai Stablecoin (Sepolia)",
        "DAI",
        18,
    ),
];

const FLOW: &[(&str, &str, &str, u8)] = &[
    (
        "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238",
        "USD Coin",
        "USDC",
        6,
    ),
    (
        "0x5566af9817cd58b79f29e3d9e8a989c0c0ef9da8",
        "Wrapped Flow",
        "WFLOW",
        18,
    ),
    (
        "0x6f0469e7f0ef36b1c86421ade1e142fd47cdb727",
        "Flow USD",
        "FUSD",
        8,
    ),
    (
        "0x7c8dff8f1c7c89b09c6b05a8d29f3d3e0c4db0c0",
        "Tether USD",
        "USDT",
        6,
    ),
    (
        "0x21c718c22d52d0f3a789b752d4c2fd5908a8a733",
        "Blocto Token",
        "BLT",
        18,
    ),
    (
        "0x6365a1a2c4d73b2f5a9dc6d838b2be85c9f69e7f",
        "Staked Flow",
        "STFLOW",
        8,
    ),
    (
        "0x6c7fe21c99a982ed0b301414a1eee4761d97d1c5",
        "REVV Racing",
        "REVV",
        18,
    ),
    // Cadence-style identifier, not reachable over EVM RPC.
    ("0x1654653399040a61:FlowToken", "Flow Token", "FLOW", 8),
    (
        "0x2aaBea2058b5aC2D339b163C6Ab6f2b6d53aabED",
        "Flow Custom Token 1",
        "FCT1",
        18,
    ),
    (
        "0x7f27352D5F83Db87a5A3E00f4B07Cc2138D8ee52",
        "Flow Custom Token 2",
        "FCT2",
        18,
    ),
];

const CELO: &[(&str, &str, &str, u8)] = &[
    (
        "0x765DE816845861e75A25fCA122bb6898B8B1282a",
        "Celo Dollar",
        "CUSD",
        18,
    ),
    (
        "0xd8763cba276a3738e6de85b4b3bf5fded6d6ca73",
        "Celo Euro",
        "CEUR",
        18,
    ),
];

static KNOWN_TOKENS: Lazy<HashMap<NetworkId, Vec<KnownToken>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(NetworkId::Sepolia, build_table(SEPOLIA));
    map.insert(NetworkId::Ethereum, Vec::new());
    map.insert(NetworkId::Flow, build_table(FLOW));
    map.insert(NetworkId::Celo, build_table(CELO));
    map
});

fn build_table(raw: &[(&str, &str, &str, u8)]) -> Vec<KnownToken> {
    raw.iter()
        .filter_map(|(address, name, symbol, decimals)| {
            if Address::from_str(address).is_err() {
                tracing::debug!(address, symbol, "Skipping non-EVM token table entry");
                return None;
            }
            Some(KnownToken {
                address: address.to_lowercase(),
                name: (*name).to_string(),
                symbol: (*symbol).to_string(),
                decimals: *decimals,
            })
        })
        .collect()
}

/// Curated tokens for a network. Empty when the network has no table.
pub fn known_tokens(id: NetworkId) -> &'static [KnownToken] {
    KNOWN_TOKENS.get(&id).map(Vec::as_slice).unwrap_or(&[])
}
