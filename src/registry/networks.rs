//! Built-in network tables.

use super::{NetworkId, NetworkSpec};

/// The networks this build ships with.
pub(crate) fn builtin() -> Vec<NetworkSpec> {
    vec![
        NetworkSpec {
            id: NetworkId::Sepolia,
            display_name: "Ethereum Sepolia".to_string(),
            chain_id: 11_155_111,
            rpc_endpoints: vec![
                "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
                "https://sepolia.drpc.org".to_string(),
                "https://rpc.sepolia.org".to_string(),
                "https://rpc2.sepolia.org".to_string(),
            ],
            indexer_endpoint: Some("https://eth-sepolia.blockscout.com/api".to_string()),
            secondary_indexer_endpoint: None,
            block_explorer: Some("https://sepolia.etherscan.io".to_string()),
            atomic_execution_supported: true,
            wallet_fallback_allowed: true,
            native_name: "Sepolia Ether".to_string(),
            native_symbol: "SepoliaETH".to_string(),
            native_decimals: 18,
        },
        NetworkSpec {
            id: NetworkId::Ethereum,
            display_name: "Ethereum Mainnet".to_string(),
            chain_id: 1,
            rpc_endpoints: vec![
                "https://eth.llamarpc.com".to_string(),
                "https://rpc.ankr.com/eth".to_string(),
                "https://ethereum.publicnode.com".to_string(),
            ],
            indexer_endpoint: Some("https://eth.blockscout.com/api".to_string()),
            secondary_indexer_endpoint: None,
            block_explorer: Some("https://etherscan.io".to_string()),
            atomic_execution_supported: false,
            wallet_fallback_allowed: true,
            native_name: "Ethereum".to_string(),
            native_symbol: "ETH".to_string(),
            native_decimals: 18,
        },
        NetworkSpec {
            id: NetworkId::Flow,
            display_name: "Flow EVM".to_string(),
            chain_id: 747,
            rpc_endpoints: vec!["https://mainnet.evm.nodes.onflow.org".to_string()],
            indexer_endpoint: Some("https://evm.flowscan.io/api".to_string()),
            secondary_indexer_endpoint: None,
            block_explorer: Some("https://evm.flowscan.io".to_string()),
            atomic_execution_supported: false,
            // Injected-wallet balance queries misreport on Flow EVM,
            // keep the resolver on direct RPC only.
            wallet_fallback_allowed: false,
            native_name: "Flow".to_string(),
            native_symbol: "FLOW".to_string(),
            native_decimals: 18,
        },
        NetworkSpec {
            id: NetworkId::Celo,
            display_name: "Celo Alfajores".to_string(),
            chain_id: 44_787,
            rpc_endpoints: vec![
                "https://celo-alfajores.drpc.org".to_string(),
                "https://alfajores-forno.celo-testnet.org".to_string(),
            ],
            indexer_endpoint: Some("https://alfajores.celoscan.io/api".to_string()),
            secondary_indexer_endpoint: None,
            block_explorer: Some("https://alfajores.celoscan.io".to_string()),
            atomic_execution_supported: true,
            wallet_fallback_allowed: false,
            native_name: "Celo".to_string(),
            native_symbol: "CELO".to_string(),
            native_decimals: 18,
        },
    ]
}
