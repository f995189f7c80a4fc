//! Transfer encoding, planning and estimation.

pub mod encode;
pub mod estimator;
pub mod planner;

pub use encode::{EncodeError, SkippedTransfer, TransferCall};
pub use estimator::CostEstimate;
pub use planner::{plan_bundle, Bundle, ExecutionMode, PlanError};
