//! Growth agent orchestrator — concurrent fan-out over all registered agents.
//!
//! `launch_all` dispatches every registered agent without waiting on any of
//! them and joins on the full set before returning, so one slow or failing
//! agent never blocks or fails the others. Each agent's state transitions and
//! progress events are written to the [`StateStore`] as it runs; health and
//! readiness reads go through the store and never touch a live run.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agents::descriptor::{AgentDescriptor, AgentResult, RunContext, RunSummary};
use crate::agents::registry::{AgentRegistry, SharedAgentRegistry};
use crate::config::OrchestratorConfig;
use crate::health::{HealthReporter, HealthSnapshot, ReadinessSummary};
use crate::state::{AgentStatus, ProgressEvent, StateStore, StateStoreError};

/// Outcome of one agent's lifecycle within a run: the agent key, its result,
/// and an optional run-level error string for the summary.
type AgentOutcome = (String, AgentResult, Option<String>);

/// Orchestrates the lifecycle of all growth agents in the system.
///
/// Construct one per process and hand it to whatever owns the HTTP layer;
/// there is no ambient global. Tests build a fresh instance each.
pub struct Orchestrator {
    pub registry: SharedAgentRegistry,
    store: Arc<dyn StateStore>,
    config: OrchestratorConfig,
    reporter: HealthReporter,
}

impl Orchestrator {
    /// Create an orchestrator backed by the given state store.
    pub fn new(config: OrchestratorConfig, store: Arc<dyn StateStore>) -> Self {
        let registry: SharedAgentRegistry = Arc::new(RwLock::new(AgentRegistry::new()));
        let reporter = HealthReporter::new(Arc::clone(&registry), Arc::clone(&store));
        Self {
            registry,
            store,
            config,
            reporter,
        }
    }

    /// Create an orchestrator backed by a fresh in-process store, with the
    /// progress cap taken from the config.
    pub fn in_memory(config: OrchestratorConfig) -> Self {
        let store = Arc::new(crate::state::InMemoryStateStore::new(config.progress_cap));
        Self::new(config, store)
    }

    /// The state store this orchestrator writes to.
    pub fn store(&self) -> Arc<dyn StateStore> {
        Arc::clone(&self.store)
    }

    /// Register an agent. Re-registering a key replaces the descriptor.
    pub async fn register_agent(&self, descriptor: AgentDescriptor) {
        debug!(
            agent = %descriptor.key,
            phase = %descriptor.phase,
            priority = descriptor.priority,
            "registering growth agent"
        );
        self.registry.write().await.register(descriptor);
    }

    /// Launch every registered agent concurrently for `ctx` and aggregate
    /// one [`RunSummary`]. Never returns an error for per-agent failures;
    /// a run over zero registered agents returns a vacuously successful
    /// summary.
    pub async fn launch_all(&self, ctx: RunContext) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let descriptors = self.registry.read().await.list();

        info!(
            run_id = %run_id,
            user_id = %ctx.user_id,
            agents = descriptors.len(),
            "launching all growth agents"
        );

        let mut joins: JoinSet<AgentOutcome> = JoinSet::new();
        let mut keys_by_task: HashMap<tokio::task::Id, String> = HashMap::new();
        for descriptor in descriptors {
            let store = Arc::clone(&self.store);
            let ctx = ctx.clone();
            let timeout_secs = self.config.agent_timeout_secs;
            let key = descriptor.key.clone();
            let handle = joins.spawn(async move {
                run_agent(store, descriptor, ctx, run_id, timeout_secs).await
            });
            keys_by_task.insert(handle.id(), key);
        }

        let mut results: HashMap<String, AgentResult> = HashMap::new();
        let mut errors: Vec<String> = Vec::new();
        while let Some(joined) = joins.join_next_with_id().await {
            match joined {
                Ok((_, (key, result, run_error))) => {
                    if let Some(msg) = run_error {
                        errors.push(msg);
                    }
                    results.insert(key, result);
                }
                // The lifecycle routine itself panicked. No result may be
                // silently discarded, so fold it in as a crashed agent.
                Err(join_err) => {
                    let key = keys_by_task
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string());
                    let msg = format!("agent {key} crashed: {join_err}");
                    warn!(run_id = %run_id, agent = %key, err = %join_err, "agent task panicked");
                    errors.push(msg.clone());
                    results.insert(key, AgentResult::failed(vec![msg]));
                }
            }
        }

        let total_agents = results.len();
        let successful_agents = results.values().filter(|r| r.success).count();
        let failed_agents = total_agents - successful_agents;
        let summary = RunSummary {
            run_id,
            success: failed_agents == 0,
            started_at,
            completed_at: Utc::now(),
            results,
            total_agents,
            successful_agents,
            failed_agents,
            errors,
        };

        info!(
            run_id = %run_id,
            success = summary.success,
            successful = successful_agents,
            failed = failed_agents,
            "growth agent run complete"
        );
        summary
    }

    /// Per-agent health view plus store connectivity, computed fresh.
    pub async fn get_health(&self) -> HealthSnapshot {
        self.reporter.get_health().await
    }

    /// Per-agent readiness flags and the `all_ready` rollup, computed fresh.
    pub async fn get_readiness(&self) -> ReadinessSummary {
        self.reporter.get_readiness().await
    }

    /// Bulk read of each registered agent's recent progress events.
    pub async fn get_progress_snapshot(
        &self,
        limit: usize,
    ) -> HashMap<String, Vec<ProgressEvent>> {
        let descriptors = self.registry.read().await.list();
        let mut snapshot = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let events = match self.store.get_progress(&descriptor.key, limit).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(agent = %descriptor.key, err = %e, "progress read failed; returning empty");
                    Vec::new()
                }
            };
            snapshot.insert(descriptor.key, events);
        }
        snapshot
    }
}

/// Drive one agent through its state machine: `Running`, the 0% starting
/// event, the single await of the runner, then the terminal status, run
/// counter, last error, and the 100% event. The start event, the status
/// transition, and the end event are written sequentially by this routine,
/// which is what makes them strictly ordered for a given agent.
async fn run_agent(
    store: Arc<dyn StateStore>,
    descriptor: AgentDescriptor,
    ctx: RunContext,
    run_id: Uuid,
    timeout_secs: Option<u64>,
) -> AgentOutcome {
    let key = descriptor.key.clone();
    let invocation_started = Utc::now();

    log_store_err(
        store.set_status(&key, AgentStatus::Running).await,
        &key,
        "set_status",
    );
    log_store_err(store.set_ready(&key, false).await, &key, "set_ready");
    log_store_err(
        store
            .append_progress(
                &key,
                ProgressEvent::new(&key, format!("{} starting", descriptor.display_name), 0),
            )
            .await,
        &key,
        "append_progress",
    );

    // Run the agent inside its own task so a panicking runner is contained
    // at this boundary instead of poisoning the lifecycle writes below.
    let runner = Arc::clone(&descriptor.runner);
    let invocation = tokio::spawn(async move { runner.run(&ctx).await });

    let outcome = match timeout_secs {
        Some(secs) => {
            match tokio::time::timeout(std::time::Duration::from_secs(secs), invocation).await {
                Ok(joined) => joined,
                Err(_) => {
                    // The runner is abandoned, not cancelled; siblings and
                    // aggregation proceed without it.
                    let msg = format!("agent {key} timed out after {secs}s");
                    warn!(run_id = %run_id, agent = %key, timeout_secs = secs, "agent timed out");
                    let result = finalize(
                        &store,
                        &key,
                        synthesized_failure(invocation_started, msg.clone()),
                    )
                    .await;
                    return (key, result, Some(msg));
                }
            }
        }
        None => invocation.await,
    };

    let (result, run_error) = match outcome {
        // Agent returned a result. Its own `success` flag decides the
        // terminal status; the result itself is passed through untouched.
        // A reported failure still surfaces in the run's error list,
        // attributed to the agent.
        Ok(Ok(result)) => {
            let run_error = if result.success {
                None
            } else {
                Some(format!(
                    "agent {key} failed: {}",
                    join_errors(&result.errors)
                ))
            };
            (result, run_error)
        }
        // Agent crashed (returned Err). Synthesize a failed result.
        Ok(Err(e)) => {
            let msg = e.to_string();
            warn!(run_id = %run_id, agent = %key, err = %msg, "agent crashed");
            (
                synthesized_failure(invocation_started, msg.clone()),
                Some(format!("agent {key} crashed: {msg}")),
            )
        }
        // Agent panicked; the spawn boundary caught it.
        Err(join_err) => {
            let msg = join_err.to_string();
            warn!(run_id = %run_id, agent = %key, err = %msg, "agent panicked");
            (
                synthesized_failure(invocation_started, msg.clone()),
                Some(format!("agent {key} crashed: {msg}")),
            )
        }
    };

    let result = finalize(&store, &key, result).await;
    (key, result, run_error)
}

/// Write the terminal status, readiness, run count, last error, and the 100%
/// progress event for one finished agent. All writes are best-effort.
async fn finalize(store: &Arc<dyn StateStore>, key: &str, result: AgentResult) -> AgentResult {
    let status = if result.success {
        AgentStatus::Ready
    } else {
        AgentStatus::Error
    };
    log_store_err(store.set_status(key, status).await, key, "set_status");
    log_store_err(store.set_ready(key, result.success).await, key, "set_ready");
    match store.increment_run_count(key).await {
        Ok(count) => debug!(agent = %key, run_count = count, status = %status, "agent finished"),
        Err(e) => warn!(agent = %key, err = %e, "run count increment failed; continuing"),
    }
    if !result.errors.is_empty() {
        log_store_err(
            store.set_last_error(key, &join_errors(&result.errors)).await,
            key,
            "set_last_error",
        );
    }
    let message = if result.success {
        format!("{key} completed")
    } else {
        format!("{key} failed")
    };
    log_store_err(
        store
            .append_progress(key, ProgressEvent::new(key, message, 100))
            .await,
        key,
        "append_progress",
    );
    result
}

/// The failed result the orchestrator substitutes when a runner crashed,
/// panicked, or timed out instead of returning one.
fn synthesized_failure(started_at: chrono::DateTime<Utc>, error: String) -> AgentResult {
    AgentResult {
        started_at,
        completed_at: Utc::now(),
        ..AgentResult::failed(vec![error])
    }
}

fn join_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        "unspecified failure".to_string()
    } else {
        errors.join("; ")
    }
}

/// Store writes never abort a run; unavailability degrades to a warning.
fn log_store_err(result: Result<(), StateStoreError>, key: &str, op: &str) {
    if let Err(e) = result {
        warn!(agent = %key, op = op, err = %e, "state store write failed; continuing");
    }
}
