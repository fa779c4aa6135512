//! Orchestrator configuration (`[orchestrator]` section of config.toml or a
//! standalone file).
//!
//! Parse failures never take the process down: a bad config file logs an
//! error and the defaults apply.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::error;

/// Default per-agent progress log cap (events, FIFO-evicted).
pub const DEFAULT_PROGRESS_CAP: usize = 200;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FORMAT: &str = "compact";

/// Tunables for the orchestrator core.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Maximum progress events retained per agent key. Default: 200.
    pub progress_cap: usize,
    /// Per-agent timeout in seconds. None (the default) means a hung agent
    /// hangs the run. Set it to mark hung agents as failed and let the rest
    /// of the run aggregate.
    pub agent_timeout_secs: Option<u64>,
    /// Log filter, e.g. "info" or "growthd=debug". Default: "info".
    pub log_level: String,
    /// Log output format: "compact" | "json". Default: "compact".
    pub log_format: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            progress_cap: DEFAULT_PROGRESS_CAP,
            agent_timeout_secs: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Load from a TOML file. A missing file is normal (defaults apply); a
    /// file that exists but fails to parse logs an error and also falls back
    /// to defaults.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str::<Self>(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(path = %path.display(), err = %e, "failed to parse config; using defaults");
                Self::default()
            }
        }
    }
}
