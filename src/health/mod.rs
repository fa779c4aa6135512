// SPDX-License-Identifier: MIT
//! Agent health and readiness reporting.
//!
//! Provides [`HealthReporter`], the stateless read path over the agent
//! registry and the state store. Nothing here is cached: every call
//! recomputes from current store state, so values are only as fresh as the
//! last write from a run.

pub mod reporter;

pub use reporter::{AgentHealth, HealthReporter, HealthSnapshot, ReadinessSummary};
