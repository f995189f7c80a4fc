//! RPC layer types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EVM chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    /// 0x-prefixed hex form used by wallet RPC methods.
    pub fn as_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from direct RPC endpoint queries.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Endpoint did not answer within the deadline.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Endpoint answered HTTP 429.
    #[error("rate limited")]
    RateLimited,

    /// Endpoint answered a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection or body transfer failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint returned a JSON-RPC error object.
    #[error("JSON-RPC error: {0}")]
    Rpc(String),

    /// Response did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Every endpoint in the failover list failed.
    #[error("all RPC endpoints failed for {method}")]
    AllEndpointsFailed { method: String },
}

/// Result alias for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;
