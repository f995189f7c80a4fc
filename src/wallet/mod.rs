//! Wallet provider subsystem.
//!
//! # Data Flow
//! ```text
//! WalletConfig (daemon URL, timeout)
//!     → http.rs (JSON-RPC 2.0 client, the production provider)
//!     → provider.rs (object-safe trait every component consumes)
//!     → capabilities.rs (negotiation on top of the trait)
//! ```
//!
//! # Security Constraints
//! - Keys never leave the wallet daemon; this crate only submits
//!   signing requests over the trait
//! - Capability and identity responses are untrusted input

pub mod capabilities;
pub mod http;
pub mod provider;

pub use capabilities::{negotiate, AtomicReadiness, WalletCapabilities};
pub use http::HttpWalletProvider;
pub use provider::{
    ProviderError, ProviderResult, TransactionRequest, TxReceipt, WalletBrand, WalletProvider,
};
