use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::JobError;
use crate::feature_set::{FeatureSet, FeatureSetRef};
use crate::lookup::EntityLookup;
use crate::runner::RunnerKind;
use crate::snapshot::JobSnapshot;
use crate::source::SourceRef;
use crate::status::{DeliveryStatus, JobStatus};
use crate::store::StoreRef;

/// Delivery progress of one feature set within one job.
///
/// Only a [`JobRecord`] creates these, so `job_id` always names its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetJobStatus {
    job_id: String,
    feature_set: FeatureSetRef,
    delivery_status: DeliveryStatus,
    /// Feature set version at the time it was associated.
    #[serde(default)]
    version: u32,
}

impl FeatureSetJobStatus {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn feature_set(&self) -> &FeatureSetRef {
        &self.feature_set
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

/// One ingestion job: identity, runner, source and sink, the feature sets it
/// populates, and where it is in its lifecycle.
///
/// The record owns its feature set associations. They are left out of the
/// record's own serialized form; a storage layer persists them next to the
/// record and must delete them with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredJob")]
pub struct JobRecord {
    id: String,
    external_id: String,
    runner: RunnerKind,
    source: SourceRef,
    sink: StoreRef,
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    feature_set_statuses: HashMap<FeatureSetRef, FeatureSetJobStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredJob {
    id: String,
    #[serde(default)]
    external_id: String,
    runner: RunnerKind,
    source: SourceRef,
    sink: StoreRef,
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoredJob> for JobRecord {
    type Error = JobError;

    fn try_from(stored: StoredJob) -> Result<Self, Self::Error> {
        if stored.id.is_empty() {
            return Err(JobError::EmptyId);
        }
        Ok(Self {
            id: stored.id,
            external_id: stored.external_id,
            runner: stored.runner,
            source: stored.source,
            sink: stored.sink,
            status: stored.status,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            feature_set_statuses: HashMap::new(),
        })
    }
}

impl JobRecord {
    /// Create a freshly submitted job in the `Pending` state.
    pub fn new(
        id: impl Into<String>,
        runner: RunnerKind,
        source: SourceRef,
        sink: StoreRef,
    ) -> Result<Self, JobError> {
        let id = id.into();
        if id.is_empty() {
            return Err(JobError::EmptyId);
        }
        let now = Utc::now();
        Ok(Self {
            id,
            external_id: String::new(),
            runner,
            source,
            sink,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
            feature_set_statuses: HashMap::new(),
        })
    }

    /// Job id in the `{source}-to-{sink}-{suffix}` form used for new submissions.
    pub fn generate_id(source: &SourceRef, sink: &StoreRef) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-to-{}-{}", source, sink, &suffix[..12])
    }

    /// Set the initial status. For later changes use [`JobRecord::transition_to`].
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_feature_set(mut self, feature_set: FeatureSetRef, version: u32) -> Self {
        self.add_feature_set(feature_set, version);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn runner(&self) -> RunnerKind {
        self.runner
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn sink(&self) -> &StoreRef {
        &self.sink
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_terminated(&self) -> bool {
        self.status.is_terminal()
    }

    /// Strictly `Running`; a pending or suspending job is not running.
    pub fn is_running(&self) -> bool {
        self.status == JobStatus::Running
    }

    pub fn sink_name(&self) -> &str {
        self.sink.as_str()
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) {
        self.external_id = external_id.into();
        self.touch();
    }

    /// Record a status reported by the runner.
    ///
    /// Re-reporting the current status is a no-op. Leaving a terminal status
    /// is refused.
    pub fn transition_to(&mut self, next: JobStatus) -> Result<(), JobError> {
        if next == self.status {
            return Ok(());
        }
        if self.status.is_terminal() {
            return Err(JobError::TerminalTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        info!("Job '{}' changed status from {} to {}", self.id, self.status, next);
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Associate a feature set at `version` with this job. Returns `false`
    /// if it already was.
    pub fn add_feature_set(&mut self, feature_set: FeatureSetRef, version: u32) -> bool {
        if self.feature_set_statuses.contains_key(&feature_set) {
            return false;
        }
        let status = FeatureSetJobStatus {
            job_id: self.id.clone(),
            feature_set: feature_set.clone(),
            delivery_status: DeliveryStatus::default(),
            version,
        };
        self.feature_set_statuses.insert(feature_set, status);
        self.touch();
        true
    }

    /// Associate `feature_set`, stamping its current version.
    pub fn associate(&mut self, feature_set: &FeatureSet) -> bool {
        self.add_feature_set(feature_set.reference(), feature_set.version)
    }

    pub fn remove_feature_set(&mut self, feature_set: &FeatureSetRef) -> Option<FeatureSetJobStatus> {
        let removed = self.feature_set_statuses.remove(feature_set);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Returns `false` if the feature set is not associated with this job.
    pub fn set_delivery_status(&mut self, feature_set: &FeatureSetRef, status: DeliveryStatus) -> bool {
        let Some(entry) = self.feature_set_statuses.get_mut(feature_set) else {
            return false;
        };
        entry.delivery_status = status;
        self.touch();
        true
    }

    /// Re-attach an association loaded from storage. Leaves `updated_at`
    /// alone; refuses an association that belongs to another job.
    pub fn attach(&mut self, status: FeatureSetJobStatus) -> Result<(), JobError> {
        if status.job_id != self.id {
            return Err(JobError::ForeignAssociation {
                job_id: self.id.clone(),
                owner: status.job_id,
            });
        }
        self.feature_set_statuses.insert(status.feature_set.clone(), status);
        Ok(())
    }

    /// Associations in no particular order.
    pub fn feature_set_statuses(&self) -> impl Iterator<Item = &FeatureSetJobStatus> {
        self.feature_set_statuses.values()
    }

    pub fn feature_set_count(&self) -> usize {
        self.feature_set_statuses.len()
    }

    /// Render the job and every collaborator it references in external form.
    ///
    /// All or nothing: the first reference that does not resolve, or the
    /// first collaborator that fails to decode, aborts the whole snapshot.
    pub fn to_external_snapshot<L>(&self, lookup: &L) -> Result<JobSnapshot, JobError>
    where
        L: EntityLookup + ?Sized,
    {
        let source = lookup
            .source(&self.source)
            .ok_or_else(|| JobError::unresolved("source", &self.source))?
            .to_external()?;
        let store = lookup
            .store(&self.sink)
            .ok_or_else(|| JobError::unresolved("store", &self.sink))?
            .to_external()?;

        let feature_sets = self
            .feature_set_statuses
            .values()
            .map(|assoc| -> Result<_, JobError> {
                let fs = lookup
                    .feature_set(assoc.feature_set())
                    .ok_or_else(|| JobError::unresolved("feature set", assoc.feature_set()))?;
                Ok(fs.to_external()?)
            })
            .collect::<Result<Vec<_>, JobError>>()?;

        debug!(
            "Built snapshot of job '{}' with {} feature sets",
            self.id,
            feature_sets.len()
        );

        Ok(JobSnapshot {
            id: self.id.clone(),
            external_id: self.external_id.clone(),
            status: self.status.to_external(),
            source,
            store,
            feature_sets,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
