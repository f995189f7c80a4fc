//! Direct network RPC subsystem.
//!
//! # Data Flow
//! ```text
//! Registry (ordered endpoint list per network)
//!     → client.rs (JSON-RPC with failover, timeouts, 429 backoff)
//!     → discovery / estimation consumers
//! ```

pub mod client;
pub mod types;

pub use client::RpcClient;
pub use types::{ChainId, RpcError, RpcResult};
