//! growthd — the growth agent orchestration core.
//!
//! An embedding process (typically an HTTP layer) registers a fixed set of
//! independent growth agents, then calls [`Orchestrator::launch_all`] to run
//! all of them concurrently for one subject. Per-agent lifecycle state, a
//! bounded progress log, the last error, and a run counter are written to a
//! [`StateStore`] as each agent runs, so health and readiness can be observed
//! without blocking on the run itself.
//!
//! Components:
//!   - [`agents::registry`] — priority-ordered agent descriptors
//!   - [`state`] — the `StateStore` trait and the in-process implementation
//!   - [`agents::orchestrator`] — concurrent fan-out and run aggregation
//!   - [`health`] — readiness/health snapshots computed from the store

pub mod agents;
pub mod config;
pub mod error;
pub mod health;
pub mod observability;
pub mod state;

// Re-export the types an embedding process touches directly.
pub use agents::descriptor::{AgentDescriptor, AgentResult, AgentRunner, RunContext, RunSummary};
pub use agents::orchestrator::Orchestrator;
pub use agents::phase::GrowthPhase;
pub use agents::registry::{AgentRegistry, SharedAgentRegistry};
pub use config::OrchestratorConfig;
pub use error::OrchestratorError;
pub use health::{AgentHealth, HealthSnapshot, ReadinessSummary};
pub use state::{AgentStatus, InMemoryStateStore, ProgressEvent, StateStore, StateStoreError};
