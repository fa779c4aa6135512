// SPDX-License-Identifier: MIT
//! Health reporter — derives per-agent health and readiness views from the
//! state store.
//!
//! Store read failures degrade to defaults (idle, not ready, no error, zero
//! runs) rather than failing the whole call; the `store_connected` flag on
//! the snapshot tells the caller how much to trust the values.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::agents::registry::SharedAgentRegistry;
use crate::state::{AgentStatus, StateStore};

/// Per-agent entry in a [`HealthSnapshot`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AgentHealth {
    pub key: String,
    pub display_name: String,
    pub status: AgentStatus,
    pub ready: bool,
    /// Timestamp of the most recent progress event, if any.
    pub last_progress_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub run_count: u64,
}

/// Aggregated health view returned by [`HealthReporter::get_health`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthSnapshot {
    /// One entry per registered agent, in priority order.
    pub agents: Vec<AgentHealth>,
    pub store_connected: bool,
    pub generated_at: DateTime<Utc>,
}

/// Readiness rollup returned by [`HealthReporter::get_readiness`].
///
/// Only registered agents appear in the map; an agent that was never
/// registered is absent, not counted as ready or not-ready.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReadinessSummary {
    pub agents: BTreeMap<String, bool>,
    /// True iff every registered agent's readiness flag is true.
    pub all_ready: bool,
}

/// Pure read path over registry + store. Stateless; construct once and share.
pub struct HealthReporter {
    registry: SharedAgentRegistry,
    store: Arc<dyn StateStore>,
}

impl HealthReporter {
    pub fn new(registry: SharedAgentRegistry, store: Arc<dyn StateStore>) -> Self {
        Self { registry, store }
    }

    /// Compute a fresh [`HealthSnapshot`] from current store state.
    pub async fn get_health(&self) -> HealthSnapshot {
        let descriptors = self.registry.read().await.list();
        debug!(agents = descriptors.len(), "computing health snapshot");

        let mut agents = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let key = descriptor.key;
            let status = self
                .store
                .get_status(&key)
                .await
                .ok()
                .flatten()
                .unwrap_or(AgentStatus::Idle);
            let ready = self.store.get_ready(&key).await.unwrap_or(false);
            let last_error = self.store.get_last_error(&key).await.ok().flatten();
            let run_count = self.store.get_run_count(&key).await.unwrap_or(0);
            let last_progress_at = self
                .store
                .get_progress(&key, 1)
                .await
                .ok()
                .and_then(|events| events.last().map(|e| e.timestamp));

            agents.push(AgentHealth {
                key,
                display_name: descriptor.display_name,
                status,
                ready,
                last_progress_at,
                last_error,
                run_count,
            });
        }

        HealthSnapshot {
            agents,
            store_connected: self.store.is_connected().await,
            generated_at: Utc::now(),
        }
    }

    /// Compute a fresh [`ReadinessSummary`] from current store state.
    pub async fn get_readiness(&self) -> ReadinessSummary {
        let descriptors = self.registry.read().await.list();
        let mut agents = BTreeMap::new();
        for descriptor in descriptors {
            let ready = self.store.get_ready(&descriptor.key).await.unwrap_or(false);
            agents.insert(descriptor.key, ready);
        }
        let all_ready = agents.values().all(|r| *r);
        ReadinessSummary { agents, all_ready }
    }
}
