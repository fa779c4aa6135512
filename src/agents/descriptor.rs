//! Agent descriptors, run context, and run result types.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::phase::GrowthPhase;
use crate::error::OrchestratorError;

/// The unit of work behind a registered agent.
///
/// `Err` models a crash: the orchestrator catches it at the per-agent
/// boundary and synthesizes a failed [`AgentResult`]. Returning
/// `Ok(AgentResult { success: false, .. })` is the explicitly-reported
/// failure path. Runners must not depend on side effects of sibling agents
/// within the same run.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, ctx: &RunContext) -> Result<AgentResult, OrchestratorError>;
}

/// Registration record for one growth agent.
///
/// Immutable once registered; registration happens once at process start.
#[derive(Clone)]
pub struct AgentDescriptor {
    /// Unique identifier, stable across runs (e.g. `"journal"`).
    pub key: String,
    pub display_name: String,
    pub phase: GrowthPhase,
    /// Lower iterates first in listings and reports. Execution stays
    /// concurrent regardless of priority.
    pub priority: u32,
    pub description: String,
    pub runner: Arc<dyn AgentRunner>,
}

impl std::fmt::Debug for AgentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDescriptor")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("phase", &self.phase)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Input to one orchestrator run. Created by the caller per run; never
/// persisted by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Required subject identifier — whose growth program this run is for.
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Explicit string-keyed extension map. Individual runners declare which
    /// keys they read; the orchestrator never interprets it.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl RunContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            display_name: None,
            timestamp: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Output of one agent execution. Produced once per agent per run; the
/// orchestrator never mutates a result it received, it only substitutes a
/// synthetic failed result when the runner crashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Free-form artifact map (URLs, ids, summaries) — opaque here.
    #[serde(default)]
    pub artifacts: HashMap<String, serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Always 0: no automatic retry is performed. Present so the result
    /// shape stays stable if a bounded retry policy is ever added.
    #[serde(default)]
    pub retries: u32,
}

impl AgentResult {
    /// A successful result with both timestamps set to now.
    pub fn ok() -> Self {
        let now = Utc::now();
        Self {
            success: true,
            errors: Vec::new(),
            artifacts: HashMap::new(),
            started_at: now,
            completed_at: now,
            retries: 0,
        }
    }

    /// A failed result carrying the given error messages.
    pub fn failed(errors: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            success: false,
            errors,
            artifacts: HashMap::new(),
            started_at: now,
            completed_at: now,
            retries: 0,
        }
    }

    pub fn with_artifact(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.artifacts.insert(key.into(), value);
        self
    }
}

/// Aggregate over one [`launch_all`](crate::Orchestrator::launch_all) call.
/// Returned to the caller and never stored; persisting or forwarding it is
/// the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Correlation id stamped on every log event of this run.
    pub run_id: Uuid,
    /// True iff zero agents failed. A run over zero registered agents is
    /// vacuously successful.
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Keyed by agent key — consumers must not rely on any array order.
    pub results: HashMap<String, AgentResult>,
    pub total_agents: usize,
    pub successful_agents: usize,
    pub failed_agents: usize,
    /// Flat list of error strings gathered from failed agents. Crashed
    /// agents render as "agent <key> crashed: ...", reported failures as
    /// "agent <key> failed: ...".
    pub errors: Vec<String>,
}
