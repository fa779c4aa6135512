// SPDX-License-Identifier: MIT
//! Logging setup for the embedding process.
//!
//! The orchestrator only emits `tracing` events; wiring a subscriber is the
//! host's job. `setup_logging` is a convenience the host can call once at
//! startup with the values from [`OrchestratorConfig`](crate::OrchestratorConfig).

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber with the given filter and format
/// ("compact" or "json"). Returns an error string instead of panicking if a
/// subscriber is already installed.
pub fn setup_logging(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = EnvFilter::new(log_level);
    let result = if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init()
    };
    result.map_err(|e| format!("failed to install tracing subscriber: {e}"))
}
