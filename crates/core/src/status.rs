use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Lifecycle state of an ingestion job, as stored.
///
/// Stored by name. `Completed`, `Aborted` and `Failed` are terminal: once a
/// job reaches one of them it never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Unknown,
    Pending,
    Running,
    Completed,
    Aborting,
    Aborted,
    Failed,
    Suspending,
    Suspended,
}

impl JobStatus {
    pub const ALL: [JobStatus; 9] = [
        JobStatus::Unknown,
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Aborting,
        JobStatus::Aborted,
        JobStatus::Failed,
        JobStatus::Suspending,
        JobStatus::Suspended,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Aborted | JobStatus::Failed)
    }

    /// States the runner passes through on its way somewhere else.
    pub fn is_transitional(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Aborting | JobStatus::Suspending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unknown => "UNKNOWN",
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Aborting => "ABORTING",
            JobStatus::Aborted => "ABORTED",
            JobStatus::Failed => "FAILED",
            JobStatus::Suspending => "SUSPENDING",
            JobStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn to_external(&self) -> IngestionJobStatus {
        match self {
            JobStatus::Unknown => IngestionJobStatus::Unknown,
            JobStatus::Pending => IngestionJobStatus::Pending,
            JobStatus::Running => IngestionJobStatus::Running,
            JobStatus::Completed => IngestionJobStatus::Completed,
            JobStatus::Aborting => IngestionJobStatus::Aborting,
            JobStatus::Aborted => IngestionJobStatus::Aborted,
            JobStatus::Failed => IngestionJobStatus::Failed,
            JobStatus::Suspending => IngestionJobStatus::Suspending,
            JobStatus::Suspended => IngestionJobStatus::Suspended,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| JobError::UnknownVariant {
                kind: "job status",
                value: s.to_string(),
            })
    }
}

/// Wire form of [`JobStatus`]. The integer codes are part of the external
/// contract and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestionJobStatus {
    Unknown = 0,
    Pending = 1,
    Running = 2,
    Completed = 3,
    Aborting = 4,
    Aborted = 5,
    Failed = 6,
    Suspending = 7,
    Suspended = 8,
}

impl IngestionJobStatus {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Per feature set delivery progress within one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    #[default]
    InProgress,
    Delivered,
}
