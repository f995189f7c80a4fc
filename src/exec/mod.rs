//! Chain alignment and bundle execution.

pub mod chain;
pub mod engine;
pub mod types;

pub use chain::ensure_chain;
pub use engine::ExecutionEngine;
pub use types::{
    CallOutcome, CallStatus, ExecutionError, ExecutionReport, ExecutionState, StepFailure,
};
