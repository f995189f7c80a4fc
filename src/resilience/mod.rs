//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! External call (RPC endpoint, indexer, wallet daemon):
//!     → bounded by a per-attempt timeout at the call site
//!     → HTTP 429: backoff.rs computes the in-place retry delay
//!     → ordered alternatives: first_success.rs picks the first winner
//!       and aggregates every failure when all are exhausted
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Every retry loop has a fixed attempt ceiling
//! - Fallback chains are flat strategy lists, not nested error handling

pub mod backoff;
pub mod first_success;

pub use backoff::retry_delay;
pub use first_success::{first_success, ExhaustedStrategies, FirstSuccess};
