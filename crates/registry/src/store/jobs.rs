use std::path::PathBuf;

use ingestjob_core::{
    EntityCatalog, FeatureSetJobStatus, JobError, JobRecord, JobSnapshot, JobStatus, SourceRef,
    StoreRef,
};
use tracing::{debug, info, warn};

use super::error::{escape_key, key_filename, JobStoreError};
use super::JobStore;

impl JobStore {
    fn job_path(&self, id: &str) -> PathBuf {
        self.base_dir.join("jobs").join(key_filename(id))
    }

    fn associations_dir(&self, id: &str) -> PathBuf {
        self.base_dir.join("job_feature_sets").join(escape_key(id))
    }

    /// Sibling directory used while rewriting a job's associations. Escaped
    /// ids never start with `.`, so these never clash with a live directory.
    fn associations_side_dir(&self, id: &str, suffix: &str) -> PathBuf {
        self.base_dir
            .join("job_feature_sets")
            .join(format!(".{}.{}", escape_key(id), suffix))
    }

    fn snapshots_dir(&self, id: &str) -> PathBuf {
        self.base_dir.join("snapshots").join(escape_key(id))
    }

    // ── Jobs ────────────────────────────────────────────────────

    /// Persist a job together with its feature set associations.
    ///
    /// Associations are written to a staging directory and swapped in with
    /// a rename, then the row is written last. A crash part way leaves the
    /// previous row and association set readable.
    pub fn save_job(&self, job: &JobRecord) -> Result<(), JobStoreError> {
        let dir = self.associations_dir(job.id());
        let staging = self.associations_side_dir(job.id(), "tmp");
        let retired = self.associations_side_dir(job.id(), "old");

        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;
        for assoc in job.feature_set_statuses() {
            let filename = key_filename(&assoc.feature_set().to_string());
            self.write_json(&staging.join(filename), assoc)?;
        }

        if dir.exists() {
            if retired.exists() {
                std::fs::remove_dir_all(&retired)?;
            }
            std::fs::rename(&dir, &retired)?;
        }
        std::fs::rename(&staging, &dir)?;
        if retired.exists() {
            std::fs::remove_dir_all(&retired)?;
        }

        self.write_json(&self.job_path(job.id()), job)?;

        debug!(
            "Saved job '{}' with {} feature set associations",
            job.id(),
            job.feature_set_count()
        );
        Ok(())
    }

    /// Load a job and re-attach its associations.
    pub fn load_job(&self, id: &str) -> Result<Option<JobRecord>, JobStoreError> {
        let Some(mut job) = self.read_json::<JobRecord>(&self.job_path(id))? else {
            return Ok(None);
        };

        // Between the two renames in save_job only the retired set exists.
        let mut dir = self.associations_dir(id);
        if !dir.exists() {
            dir = self.associations_side_dir(id, "old");
        }
        if dir.exists() {
            for key in self.list_keys(&dir)? {
                let path = dir.join(key_filename(&key));
                if let Some(assoc) = self.read_json::<FeatureSetJobStatus>(&path)? {
                    job.attach(assoc)?;
                }
            }
        }
        Ok(Some(job))
    }

    fn require_job(&self, id: &str) -> Result<JobRecord, JobStoreError> {
        self.load_job(id)?
            .ok_or_else(|| JobStoreError::JobNotFound(id.to_string()))
    }

    /// Ids of every stored job, sorted.
    pub fn list_job_ids(&self) -> Result<Vec<String>, JobStoreError> {
        self.list_keys(&self.base_dir.join("jobs"))
    }

    pub fn list_jobs(&self) -> Result<Vec<JobRecord>, JobStoreError> {
        let mut jobs = Vec::new();
        for id in self.list_job_ids()? {
            if let Some(job) = self.load_job(&id)? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    pub fn list_jobs_by_status(&self, status: JobStatus) -> Result<Vec<JobRecord>, JobStoreError> {
        Ok(self
            .list_jobs()?
            .into_iter()
            .filter(|job| job.status() == status)
            .collect())
    }

    /// The most recently updated job for a source/sink pair that has not
    /// terminated, if any.
    pub fn find_active_job(
        &self,
        source: &SourceRef,
        sink: &StoreRef,
    ) -> Result<Option<JobRecord>, JobStoreError> {
        Ok(self
            .list_jobs()?
            .into_iter()
            .filter(|job| job.source() == source && job.sink() == sink && !job.has_terminated())
            .max_by_key(|job| job.updated_at()))
    }

    /// Delete a job and, first, every association it owns along with its
    /// exported snapshots.
    ///
    /// Returns `false` if no such job was stored.
    pub fn delete_job(&self, id: &str) -> Result<bool, JobStoreError> {
        for dir in [
            self.associations_dir(id),
            self.associations_side_dir(id, "tmp"),
            self.associations_side_dir(id, "old"),
            self.snapshots_dir(id),
        ] {
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
        }

        let path = self.job_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        info!("Deleted job '{}' with its feature set associations and snapshots", id);
        Ok(true)
    }

    /// Apply a status reported by the runner and persist it.
    pub fn update_status(&self, id: &str, status: JobStatus) -> Result<JobRecord, JobStoreError> {
        let mut job = self.require_job(id)?;
        job.transition_to(status)?;
        self.save_job(&job)?;
        Ok(job)
    }

    pub fn set_external_id(&self, id: &str, external_id: &str) -> Result<JobRecord, JobStoreError> {
        let mut job = self.require_job(id)?;
        if !job.external_id().is_empty() && job.external_id() != external_id {
            warn!(
                "Replacing external id '{}' of job '{}' with '{}'",
                job.external_id(),
                id,
                external_id
            );
        }
        job.set_external_id(external_id);
        self.save_job(&job)?;
        Ok(job)
    }

    // ── Snapshots ───────────────────────────────────────────────

    /// Load every collaborator `job` references into an in-memory lookup.
    ///
    /// A reference with no stored entity is reported as unresolved.
    pub fn load_lookup_for(&self, job: &JobRecord) -> Result<EntityCatalog, JobStoreError> {
        let mut catalog = EntityCatalog::new();

        let source = self
            .load_source(job.source())?
            .ok_or_else(|| unresolved("source", job.source()))?;
        catalog.insert_source(source);

        let store = self
            .load_store(job.sink())?
            .ok_or_else(|| unresolved("store", job.sink()))?;
        catalog.insert_store(store);

        for assoc in job.feature_set_statuses() {
            let feature_set = self
                .load_feature_set(assoc.feature_set())?
                .ok_or_else(|| unresolved("feature set", assoc.feature_set()))?;
            catalog.insert_feature_set(feature_set);
        }

        Ok(catalog)
    }

    pub fn snapshot_job(&self, id: &str) -> Result<JobSnapshot, JobStoreError> {
        let job = self.require_job(id)?;
        let lookup = self.load_lookup_for(&job)?;
        Ok(job.to_external_snapshot(&lookup)?)
    }

    /// Write the job's current snapshot under `snapshots/{job_id}/` with a
    /// timestamp-based filename, returning the path.
    pub fn export_snapshot(&self, id: &str) -> Result<PathBuf, JobStoreError> {
        let snapshot = self.snapshot_job(id)?;

        let dir = self.snapshots_dir(id);
        std::fs::create_dir_all(&dir)?;
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let path = dir.join(format!("{}.json", ts));
        self.write_json(&path, &snapshot)?;

        info!(
            "Exported snapshot of job '{}' with {} feature sets to {}",
            id,
            snapshot.feature_sets.len(),
            path.display()
        );
        Ok(path)
    }
}

fn unresolved(kind: &'static str, key: impl std::fmt::Display) -> JobStoreError {
    JobStoreError::Job(JobError::Unresolved {
        kind,
        key: key.to_string(),
    })
}
