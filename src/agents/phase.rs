//! Growth phase definitions for agent grouping and ordering.

use serde::{Deserialize, Serialize};

/// The three phases of the growth program. Used for grouping and reporting
/// order only; execution inside a run is always concurrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPhase {
    /// Self-knowledge groundwork: journaling, mindset baselines.
    Foundation,
    /// Aligning daily structure with stated goals: rhythm, calendar.
    Alignment,
    /// Forward motion: purpose synthesis, accountability.
    Momentum,
}

impl GrowthPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::Alignment => "alignment",
            Self::Momentum => "momentum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "foundation" => Some(Self::Foundation),
            "alignment" => Some(Self::Alignment),
            "momentum" => Some(Self::Momentum),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrowthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
