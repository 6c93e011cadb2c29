use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Execution backend that runs an ingestion job.
///
/// Persisted and sent over the wire by its runner name, never by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunnerKind {
    #[serde(rename = "DataflowRunner")]
    Dataflow,
    #[serde(rename = "DirectRunner")]
    Direct,
}

impl RunnerKind {
    pub const ALL: [RunnerKind; 2] = [RunnerKind::Dataflow, RunnerKind::Direct];

    pub fn name(&self) -> &'static str {
        match self {
            RunnerKind::Dataflow => "DataflowRunner",
            RunnerKind::Direct => "DirectRunner",
        }
    }
}

impl std::fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RunnerKind {
    type Err = JobError;

    /// Accepts the runner name (`DirectRunner`) or its short form (`direct`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunnerKind::ALL
            .into_iter()
            .find(|r| {
                r.name().eq_ignore_ascii_case(s)
                    || r.name().trim_end_matches("Runner").eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| JobError::UnknownVariant {
                kind: "runner",
                value: s.to_string(),
            })
    }
}
