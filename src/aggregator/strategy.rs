use serde::{Deserialize, Serialize};
use std::fmt;

/// How worker counts by phase are obtained from the remote API
///
/// Both strategies produce the same counts for a stable upstream; they trade
/// request count against transfer size. A single cycle uses exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseCountStrategy {
    /// One unfiltered listing, bucketed locally by worker phase
    #[default]
    Bucketed,
    /// One phase-filtered listing per phase, counted from pagination metadata
    PerPhase,
}

impl fmt::Display for PhaseCountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucketed => write!(f, "bucketed"),
            Self::PerPhase => write!(f, "per_phase"),
        }
    }
}

impl std::str::FromStr for PhaseCountStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bucketed" => Ok(Self::Bucketed),
            "per_phase" | "per-phase" => Ok(Self::PerPhase),
            _ => Err(format!("Invalid phase count strategy: {s}")),
        }
    }
}
