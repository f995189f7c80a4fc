//! Execution lifecycle types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::rpc::ChainId;
use crate::wallet::ProviderError;

/// Lifecycle of one bundle execution.
///
/// ```text
/// Planned → NegotiatingChain → SubmittingAtomic ────────────→ Confirmed
///                                   │ (all methods fail)
///                                   ↓
///                             SubmittingSequential ─→ Confirmed / Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Bundle built, nothing sent.
    Planned,
    /// Aligning the wallet's active chain with the target network.
    NegotiatingChain,
    /// Trying the atomic submission methods in order.
    SubmittingAtomic,
    /// Sending calls one by one, each confirmed before the next.
    SubmittingSequential,
    /// Terminal: every call landed.
    Confirmed,
    /// Terminal: a sequential step failed and the remainder was not sent.
    Aborted,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionState::Planned => "planned",
            ExecutionState::NegotiatingChain => "negotiating_chain",
            ExecutionState::SubmittingAtomic => "submitting_atomic",
            ExecutionState::SubmittingSequential => "submitting_sequential",
            ExecutionState::Confirmed => "confirmed",
            ExecutionState::Aborted => "aborted",
        })
    }
}

/// Failures that stop execution before any transaction is sent.
/// Once a call has been submitted the engine always runs to a terminal
/// report instead of returning one of these.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("wallet chain query failed")]
    ChainUnavailable(#[source] ProviderError),

    #[error("wallet declined the switch to chain {0}")]
    SwitchDeclined(ChainId, #[source] ProviderError),

    #[error("wallet stayed on chain {actual} after a switch to {expected}")]
    ChainMismatch { expected: ChainId, actual: ChainId },

    #[error("execution cancelled before submission")]
    Cancelled,
}

/// On-chain result of one call in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Landed with success status.
    Confirmed,
    /// Submission or on-chain execution failed.
    Failed,
    /// Never sent because an earlier step failed.
    Skipped,
}

/// Recorded outcome for one call. Every call in an executed bundle gets
/// exactly one of these, sent or not.
#[derive(Debug, Clone, Serialize)]
pub struct CallOutcome {
    /// Position in the plan.
    pub index: usize,
    /// The call's human-readable label.
    pub description: String,
    /// Transaction hash, when a submission was accepted.
    pub tx_hash: Option<String>,
    /// Block the transaction landed in, when confirmed.
    pub block_number: Option<u64>,
    /// Terminal status of this call.
    pub status: CallStatus,
    /// Failure reason, for failed calls.
    pub reason: Option<String>,
}

/// The sequential step that aborted the plan.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    /// Index of the failing call.
    pub index: usize,
    /// What went wrong.
    pub reason: String,
}

/// Terminal record of one bundle execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Plan this execution ran.
    pub plan_id: Uuid,
    /// Terminal state, [`ExecutionState::Confirmed`] or [`ExecutionState::Aborted`].
    pub state: ExecutionState,
    /// Submission method that produced the reference: one of the atomic
    /// method names, or `"sequential"`.
    pub method: &'static str,
    /// Canonical execution reference: the atomic batch identifier, or the
    /// first submitted transaction hash.
    pub reference: Option<String>,
    /// True when atomic submission was negotiated but every method failed
    /// and the engine fell back to sequential mode.
    pub downgraded: bool,
    /// One outcome per call, in plan order.
    pub outcomes: Vec<CallOutcome>,
    /// The aborting step, when the terminal state is Aborted.
    pub failure: Option<StepFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ExecutionState::SubmittingAtomic.to_string(), "submitting_atomic");
        assert_eq!(ExecutionState::Aborted.to_string(), "aborted");
    }

    #[test]
    fn test_chain_mismatch_message() {
        let err = ExecutionError::ChainMismatch {
            expected: ChainId(11_155_111),
            actual: ChainId(1),
        };
        let text = err.to_string();
        assert!(text.contains("11155111") && text.contains('1'));
    }
}
