//! Growth agent orchestration.
//!
//! The orchestrator launches every registered agent concurrently for a single
//! run context, tracks each agent's lifecycle in the configured
//! [`StateStore`](crate::StateStore), and aggregates one
//! [`RunSummary`](crate::RunSummary) per run. Agents themselves are opaque
//! callables; their content (journal prompts, mindset reframes, rhythm
//! heuristics, purpose synthesis) lives with the caller.

pub mod descriptor;
pub mod orchestrator;
pub mod phase;
pub mod registry;
