// SPDX-License-Identifier: MIT
//! In-process state store.
//!
//! All five logical fields for one agent key live in a single record, and the
//! whole record map sits behind one `RwLock`. Read-modify-write sequences
//! (append-then-trim, increment-run-count) run under the write lock, so
//! concurrent runs against the same key cannot lose updates or grow a
//! progress log past the cap.
//!
//! Known limitation: this is safe within a single process only. Multiple
//! server instances need a shared-store implementation of
//! [`StateStore`](super::StateStore) with its own cross-process atomicity.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{AgentStatus, ProgressEvent, StateStore, StateStoreError};

/// Per-key record holding all tracked fields.
#[derive(Debug, Default)]
struct AgentState {
    status: Option<AgentStatus>,
    ready: bool,
    progress: VecDeque<ProgressEvent>,
    last_error: Option<String>,
    run_count: u64,
}

/// Map-based [`StateStore`] implementation. Volatile; reset on restart.
///
/// Cheaply cloneable — all clones share the same state via `Arc`.
#[derive(Clone)]
pub struct InMemoryStateStore {
    agents: Arc<RwLock<HashMap<String, AgentState>>>,
    progress_cap: usize,
}

impl InMemoryStateStore {
    /// Create a store with the given per-key progress log cap.
    pub fn new(progress_cap: usize) -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
            progress_cap,
        }
    }

    pub fn progress_cap(&self) -> usize {
        self.progress_cap
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PROGRESS_CAP)
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn set_status(&self, key: &str, status: AgentStatus) -> Result<(), StateStoreError> {
        let mut agents = self.agents.write().await;
        agents.entry(key.to_string()).or_default().status = Some(status);
        Ok(())
    }

    async fn get_status(&self, key: &str) -> Result<Option<AgentStatus>, StateStoreError> {
        let agents = self.agents.read().await;
        Ok(agents.get(key).and_then(|a| a.status))
    }

    async fn set_ready(&self, key: &str, ready: bool) -> Result<(), StateStoreError> {
        let mut agents = self.agents.write().await;
        agents.entry(key.to_string()).or_default().ready = ready;
        Ok(())
    }

    async fn get_ready(&self, key: &str) -> Result<bool, StateStoreError> {
        let agents = self.agents.read().await;
        Ok(agents.get(key).map(|a| a.ready).unwrap_or(false))
    }

    async fn append_progress(
        &self,
        key: &str,
        event: ProgressEvent,
    ) -> Result<(), StateStoreError> {
        let mut agents = self.agents.write().await;
        let state = agents.entry(key.to_string()).or_default();
        state.progress.push_back(event);
        // FIFO eviction: trim from the oldest end once past the cap.
        while state.progress.len() > self.progress_cap {
            state.progress.pop_front();
        }
        Ok(())
    }

    async fn get_progress(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<ProgressEvent>, StateStoreError> {
        let agents = self.agents.read().await;
        let Some(state) = agents.get(key) else {
            return Ok(Vec::new());
        };
        let skip = state.progress.len().saturating_sub(limit);
        Ok(state.progress.iter().skip(skip).cloned().collect())
    }

    async fn set_last_error(&self, key: &str, message: &str) -> Result<(), StateStoreError> {
        let mut agents = self.agents.write().await;
        agents.entry(key.to_string()).or_default().last_error = Some(message.to_string());
        Ok(())
    }

    async fn get_last_error(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        let agents = self.agents.read().await;
        Ok(agents.get(key).and_then(|a| a.last_error.clone()))
    }

    async fn increment_run_count(&self, key: &str) -> Result<u64, StateStoreError> {
        let mut agents = self.agents.write().await;
        let state = agents.entry(key.to_string()).or_default();
        state.run_count += 1;
        Ok(state.run_count)
    }

    async fn get_run_count(&self, key: &str) -> Result<u64, StateStoreError> {
        let agents = self.agents.read().await;
        Ok(agents.get(key).map(|a| a.run_count).unwrap_or(0))
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
