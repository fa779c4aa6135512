//! Integration tests for the growth agent orchestrator: concurrent fan-out,
//! per-agent failure containment, and run summary aggregation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use growthd::{
    AgentDescriptor, AgentResult, AgentRunner, GrowthPhase, Orchestrator, OrchestratorConfig,
    OrchestratorError, RunContext,
};

// ─── Test runners ────────────────────────────────────────────────────────────

/// Succeeds after an optional delay.
struct Succeeds {
    delay: Option<Duration>,
}

#[async_trait::async_trait]
impl AgentRunner for Succeeds {
    async fn run(&self, _ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(AgentResult::ok().with_artifact("note", serde_json::json!("done")))
    }
}

/// Explicitly reports failure with the given messages.
struct ReportsFailure {
    errors: Vec<String>,
}

#[async_trait::async_trait]
impl AgentRunner for ReportsFailure {
    async fn run(&self, _ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        Ok(AgentResult::failed(self.errors.clone()))
    }
}

/// Crashes by returning an error from the runner.
struct Crashes;

#[async_trait::async_trait]
impl AgentRunner for Crashes {
    async fn run(&self, _ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        Err(OrchestratorError::AgentFailed("boom".to_string()))
    }
}

/// Panics mid-run.
struct Panics;

#[async_trait::async_trait]
impl AgentRunner for Panics {
    async fn run(&self, _ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        panic!("runner panicked");
    }
}

/// Never completes on its own.
struct Hangs;

#[async_trait::async_trait]
impl AgentRunner for Hangs {
    async fn run(&self, _ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(AgentResult::ok())
    }
}

/// Fails on the first call, succeeds afterwards.
struct FailsOnce {
    failed_already: AtomicBool,
}

#[async_trait::async_trait]
impl AgentRunner for FailsOnce {
    async fn run(&self, _ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        if self.failed_already.swap(true, Ordering::SeqCst) {
            Ok(AgentResult::ok())
        } else {
            Ok(AgentResult::failed(vec!["first attempt".to_string()]))
        }
    }
}

fn agent(key: &str, priority: u32, runner: Arc<dyn AgentRunner>) -> AgentDescriptor {
    AgentDescriptor {
        key: key.to_string(),
        display_name: key.to_string(),
        phase: GrowthPhase::Foundation,
        priority,
        description: format!("test agent {key}"),
        runner,
    }
}

fn orchestrator() -> Orchestrator {
    Orchestrator::in_memory(OrchestratorConfig::default())
}

// ─── Scenario A: single succeeding agent ─────────────────────────────────────

#[tokio::test]
async fn single_agent_success() {
    let orch = orchestrator();
    orch.register_agent(agent("t1", 1, Arc::new(Succeeds { delay: None })))
        .await;

    let summary = orch.launch_all(RunContext::new("u1")).await;

    assert!(summary.success);
    assert_eq!(summary.total_agents, 1);
    assert_eq!(summary.successful_agents, 1);
    assert_eq!(summary.failed_agents, 0);
    assert!(summary.errors.is_empty());
    let result = summary.results.get("t1").expect("t1 result should exist");
    assert!(result.success);
    assert_eq!(result.retries, 0);

    let readiness = orch.get_readiness().await;
    assert_eq!(readiness.agents.get("t1"), Some(&true));
    assert!(readiness.all_ready);
}

// ─── Scenario B: mixed success and reported failure ─────────────────────────

#[tokio::test]
async fn reported_failure_is_aggregated() {
    let orch = orchestrator();
    orch.register_agent(agent("t1", 1, Arc::new(Succeeds { delay: None })))
        .await;
    orch.register_agent(agent(
        "t2",
        2,
        Arc::new(ReportsFailure {
            errors: vec!["bad input".to_string()],
        }),
    ))
    .await;

    let summary = orch.launch_all(RunContext::new("u1")).await;

    assert!(!summary.success);
    assert_eq!(summary.total_agents, 2);
    assert_eq!(summary.successful_agents, 1);
    assert_eq!(summary.failed_agents, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(
        summary.errors[0].contains("t2") && summary.errors[0].contains("bad input"),
        "run error should name the agent and its message, got: {}",
        summary.errors[0]
    );

    let readiness = orch.get_readiness().await;
    assert_eq!(readiness.agents.get("t1"), Some(&true));
    assert_eq!(readiness.agents.get("t2"), Some(&false));
    assert!(!readiness.all_ready);
}

// ─── Scenario C: crashed agent does not take siblings down ──────────────────

#[tokio::test]
async fn crashed_agent_is_contained() {
    let orch = orchestrator();
    orch.register_agent(agent("stable", 1, Arc::new(Succeeds { delay: None })))
        .await;
    orch.register_agent(agent("crashy", 2, Arc::new(Crashes))).await;

    let summary = orch.launch_all(RunContext::new("u1")).await;
    let store = orch.store();

    assert!(!summary.success);
    let crashed = summary.results.get("crashy").expect("crashy result");
    assert!(!crashed.success, "crashed agent result must be a failure");
    assert_eq!(
        store.get_status("crashy").await.unwrap(),
        Some(growthd::AgentStatus::Error)
    );
    let last_error = store
        .get_last_error("crashy")
        .await
        .unwrap()
        .expect("last error should be recorded");
    assert!(last_error.contains("boom"), "got: {last_error}");
    // Crashed agents are identified at the run level.
    assert!(summary
        .errors
        .iter()
        .any(|e| e.contains("crashy") && e.contains("crashed")));

    // The sibling still reached ready.
    assert_eq!(
        store.get_status("stable").await.unwrap(),
        Some(growthd::AgentStatus::Ready)
    );
    assert!(store.get_ready("stable").await.unwrap());
}

#[tokio::test]
async fn panicking_agent_is_contained() {
    let orch = orchestrator();
    orch.register_agent(agent("stable", 1, Arc::new(Succeeds { delay: None })))
        .await;
    orch.register_agent(agent("panicky", 2, Arc::new(Panics))).await;

    let summary = orch.launch_all(RunContext::new("u1")).await;

    assert!(!summary.success);
    assert_eq!(summary.total_agents, 2);
    assert!(!summary.results.get("panicky").expect("panicky result").success);
    assert!(summary.results.get("stable").expect("stable result").success);
    assert!(summary
        .errors
        .iter()
        .any(|e| e.contains("panicky") && e.contains("crashed")));
}

// ─── Concurrency: wall clock tracks the slowest agent, not the sum ──────────

#[tokio::test]
async fn agents_run_concurrently() {
    let orch = orchestrator();
    orch.register_agent(agent(
        "slow",
        1,
        Arc::new(Succeeds {
            delay: Some(Duration::from_millis(100)),
        }),
    ))
    .await;
    orch.register_agent(agent(
        "fast",
        2,
        Arc::new(Succeeds {
            delay: Some(Duration::from_millis(50)),
        }),
    ))
    .await;

    let started = std::time::Instant::now();
    let summary = orch.launch_all(RunContext::new("u1")).await;
    let elapsed = started.elapsed();

    assert!(summary.success);
    assert_eq!(summary.successful_agents, 2);
    assert!(
        elapsed < Duration::from_millis(180),
        "expected concurrent execution near the slower delay, took {elapsed:?}"
    );
}

// ─── Edge cases ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn zero_registered_agents_is_a_successful_run() {
    let orch = orchestrator();

    let summary = orch.launch_all(RunContext::new("u1")).await;

    assert!(summary.success);
    assert_eq!(summary.total_agents, 0);
    assert_eq!(summary.successful_agents, 0);
    assert_eq!(summary.failed_agents, 0);
    // Vacuous AND over zero agents.
    assert!(orch.get_readiness().await.all_ready);
}

#[tokio::test]
async fn rerun_reenters_running_from_error() {
    let orch = orchestrator();
    orch.register_agent(agent(
        "flaky",
        1,
        Arc::new(FailsOnce {
            failed_already: AtomicBool::new(false),
        }),
    ))
    .await;

    let first = orch.launch_all(RunContext::new("u1")).await;
    assert!(!first.success);
    assert_eq!(
        orch.store().get_status("flaky").await.unwrap(),
        Some(growthd::AgentStatus::Error)
    );

    // No idle re-entry: a second run goes straight back through running.
    let second = orch.launch_all(RunContext::new("u1")).await;
    assert!(second.success);
    assert_eq!(
        orch.store().get_status("flaky").await.unwrap(),
        Some(growthd::AgentStatus::Ready)
    );
    assert_eq!(orch.store().get_run_count("flaky").await.unwrap(), 2);
}

#[tokio::test]
async fn progress_has_start_and_end_events() {
    let orch = orchestrator();
    orch.register_agent(agent("t1", 1, Arc::new(Succeeds { delay: None })))
        .await;
    orch.register_agent(agent(
        "t2",
        2,
        Arc::new(ReportsFailure {
            errors: vec!["nope".to_string()],
        }),
    ))
    .await;

    orch.launch_all(RunContext::new("u1")).await;

    let snapshot = orch.get_progress_snapshot(10).await;
    let t1 = snapshot.get("t1").expect("t1 progress");
    assert_eq!(t1.len(), 2);
    assert_eq!(t1[0].percent, 0);
    assert_eq!(t1[1].percent, 100);
    assert!(t1[1].message.contains("completed"));
    assert!(t1[0].timestamp <= t1[1].timestamp);

    let t2 = snapshot.get("t2").expect("t2 progress");
    assert!(t2[1].message.contains("failed"));
}

#[tokio::test]
async fn re_registering_an_agent_replaces_it() {
    let orch = orchestrator();
    orch.register_agent(agent(
        "t1",
        1,
        Arc::new(ReportsFailure {
            errors: vec!["old runner".to_string()],
        }),
    ))
    .await;
    orch.register_agent(agent("t1", 1, Arc::new(Succeeds { delay: None })))
        .await;

    let summary = orch.launch_all(RunContext::new("u1")).await;
    assert_eq!(summary.total_agents, 1);
    assert!(summary.success);
}

// ─── Timeout hardening (opt-in) ──────────────────────────────────────────────

#[tokio::test]
async fn hung_agent_times_out_when_configured() {
    let config = OrchestratorConfig {
        agent_timeout_secs: Some(1),
        ..Default::default()
    };
    let orch = Orchestrator::in_memory(config);
    orch.register_agent(agent("hung", 1, Arc::new(Hangs))).await;
    orch.register_agent(agent("ok", 2, Arc::new(Succeeds { delay: None })))
        .await;

    let summary = orch.launch_all(RunContext::new("u1")).await;

    assert!(!summary.success);
    assert!(!summary.results.get("hung").expect("hung result").success);
    assert!(summary.results.get("ok").expect("ok result").success);
    assert!(summary
        .errors
        .iter()
        .any(|e| e.contains("hung") && e.contains("timed out")));
    assert_eq!(
        orch.store().get_status("hung").await.unwrap(),
        Some(growthd::AgentStatus::Error)
    );
}

// ─── Run context plumbing ────────────────────────────────────────────────────

/// Reads a declared extension key from the context.
struct ReadsExtra;

#[async_trait::async_trait]
impl AgentRunner for ReadsExtra {
    async fn run(&self, ctx: &RunContext) -> Result<AgentResult, OrchestratorError> {
        match ctx.extra.get("focus_area").and_then(|v| v.as_str()) {
            Some(area) => {
                Ok(AgentResult::ok().with_artifact("focus_area", serde_json::json!(area)))
            }
            None => Ok(AgentResult::failed(vec!["focus_area missing".to_string()])),
        }
    }
}

#[tokio::test]
async fn runners_see_the_extension_map() {
    let orch = orchestrator();
    orch.register_agent(agent("focus", 1, Arc::new(ReadsExtra))).await;

    let ctx = RunContext::new("u1").with_extra("focus_area", serde_json::json!("deep work"));
    let summary = orch.launch_all(ctx).await;

    assert!(summary.success);
    let result = summary.results.get("focus").expect("focus result");
    assert_eq!(
        result.artifacts.get("focus_area"),
        Some(&serde_json::json!("deep work"))
    );
}
