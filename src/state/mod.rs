// SPDX-License-Identifier: MIT
//! Agent state persistence.
//!
//! Every orchestrator operation against state goes through the [`StateStore`]
//! trait, so swapping the backing store (process-local map vs. a shared
//! external cache) never touches orchestration logic. This crate ships the
//! in-process [`InMemoryStateStore`]; a shared-store implementation is an
//! extension point whose obligations are spelled out on the trait.
//!
//! Five logical fields are tracked per agent key: current status, readiness
//! flag, a bounded progress log, the last error string, and a monotonic run
//! counter.

pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::InMemoryStateStore;

/// Current lifecycle state of a registered agent.
///
/// Transitions: `Idle → Running → {Ready, Error}`. `Idle` exists only before
/// the first run; a later run re-enters `Running` directly from either
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Running,
    Ready,
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only progress log record for an agent.
///
/// The orchestrator guarantees two events per agent per run: a 0% "starting"
/// event immediately before invocation and a 100% "completed"/"failed" event
/// immediately after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub agent_key: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// 0–100.
    pub percent: u8,
    /// Optional structured payload, opaque to the orchestrator.
    pub data: Option<serde_json::Value>,
}

impl ProgressEvent {
    pub fn new(agent_key: impl Into<String>, message: impl Into<String>, percent: u8) -> Self {
        Self {
            agent_key: agent_key.into(),
            timestamp: Utc::now(),
            message: message.into(),
            percent,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Errors surfaced by a state store implementation.
///
/// The in-process store is infallible in practice; the variants exist so a
/// shared-store implementation can report transport failures through the same
/// seam. Callers on the write path treat these as best-effort (log and
/// continue), never as a reason to abort a run.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),
    #[error("state store operation failed: {0}")]
    Operation(String),
}

/// Abstraction over per-agent orchestration state.
///
/// # Implementation contract
///
/// - `get_ready` returns `false` for keys never written.
/// - `append_progress` appends, then trims from the oldest end so the per-key
///   log never exceeds the implementation's cap (FIFO eviction, not
///   time-based expiry).
/// - `get_progress` returns at most `limit` of the most recent events,
///   oldest-first within the returned slice.
/// - `increment_run_count` must be atomic with respect to concurrent callers
///   within one process. A shared-store implementation must extend the same
///   guarantee across processes (an atomic increment primitive, and an atomic
///   push-then-trim primitive for `append_progress`) so the single-process
///   semantics hold when the store is swapped.
/// - `is_connected` reports backing-store connectivity; the in-process store
///   is always connected.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    async fn set_status(&self, key: &str, status: AgentStatus) -> Result<(), StateStoreError>;
    async fn get_status(&self, key: &str) -> Result<Option<AgentStatus>, StateStoreError>;

    async fn set_ready(&self, key: &str, ready: bool) -> Result<(), StateStoreError>;
    async fn get_ready(&self, key: &str) -> Result<bool, StateStoreError>;

    async fn append_progress(&self, key: &str, event: ProgressEvent)
        -> Result<(), StateStoreError>;
    async fn get_progress(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<ProgressEvent>, StateStoreError>;

    async fn set_last_error(&self, key: &str, message: &str) -> Result<(), StateStoreError>;
    async fn get_last_error(&self, key: &str) -> Result<Option<String>, StateStoreError>;

    /// Increment and return the new run count for `key`.
    async fn increment_run_count(&self, key: &str) -> Result<u64, StateStoreError>;
    async fn get_run_count(&self, key: &str) -> Result<u64, StateStoreError>;

    async fn is_connected(&self) -> bool;
}
