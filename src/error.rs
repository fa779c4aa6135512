//! Error types for the orchestrator and agent runners.

use crate::state::StateStoreError;

/// Errors produced by agent runners and the orchestrator itself.
///
/// An `Err` returned from [`AgentRunner::run`](crate::AgentRunner::run) models
/// the "crashed" case: the orchestrator catches it at the per-agent boundary,
/// synthesizes a failed [`AgentResult`](crate::AgentResult), and keeps the
/// sibling agents running. It is never propagated out of
/// [`launch_all`](crate::Orchestrator::launch_all).
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// An agent runner reported an unrecoverable internal failure.
    #[error("agent failure: {0}")]
    AgentFailed(String),

    /// An agent exceeded the configured per-agent timeout.
    #[error("agent {key} timed out after {timeout_secs}s")]
    Timeout { key: String, timeout_secs: u64 },

    /// A state store operation failed.
    #[error("state store error: {0}")]
    Store(#[from] StateStoreError),
}
