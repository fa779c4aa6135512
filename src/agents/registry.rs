//! Agent registry — the static, ordered collection of agent descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::agents::descriptor::AgentDescriptor;
use crate::agents::phase::GrowthPhase;

/// In-memory registry of all agents known to this process.
///
/// Registration is idempotent per key: re-registering a key replaces the
/// existing descriptor, it never duplicates. No I/O.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentDescriptor>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Add or replace a descriptor by key.
    pub fn register(&mut self, descriptor: AgentDescriptor) {
        self.agents.insert(descriptor.key.clone(), descriptor);
    }

    /// All descriptors, ascending by priority. Ties break by key so the
    /// order is stable across calls.
    pub fn list(&self) -> Vec<AgentDescriptor> {
        let mut all: Vec<AgentDescriptor> = self.agents.values().cloned().collect();
        all.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.key.cmp(&b.key)));
        all
    }

    pub fn by_key(&self, key: &str) -> Option<&AgentDescriptor> {
        self.agents.get(key)
    }

    /// Descriptors in the given phase, in priority order.
    pub fn by_phase(&self, phase: GrowthPhase) -> Vec<AgentDescriptor> {
        self.list()
            .into_iter()
            .filter(|d| d.phase == phase)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Thread-safe shared registry.
pub type SharedAgentRegistry = Arc<RwLock<AgentRegistry>>;
