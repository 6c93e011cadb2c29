mod error;
mod jobs;

pub use error::JobStoreError;

use std::path::{Path, PathBuf};

use ingestjob_core::{FeatureSet, FeatureSetRef, Source, SourceRef, Store, StoreRef};
use serde::de::DeserializeOwned;
use serde::Serialize;

use error::{filename_key, key_filename};

/// Filesystem-backed registry of ingestion jobs and the entities they
/// reference.
///
/// Manages the `data/registry/` directory structure:
/// ```text
/// registry/
///   sources/{id}.json
///   stores/{name}.json
///   feature_sets/{project}%2F{name}.json
///   jobs/{id}.json                    <- job row, no associations
///   job_feature_sets/{job_id}/
///     {project}%2F{name}.json         <- one per associated feature set
///   snapshots/{job_id}/
///     2026-02-16T04-16-00.000.json    <- exported wire snapshots
/// ```
///
/// Keys are escaped into single path components (`%` to `%25`, `/` to
/// `%2F`), so distinct keys never share a file.
///
/// A job's associations and snapshots are removed by
/// [`JobStore::delete_job`] before the row itself.
///
/// Single writer: no locking is done, so callers sharing a directory must
/// serialize their writes.
pub struct JobStore {
    base_dir: PathBuf,
    pretty: bool,
}

impl JobStore {
    /// Create a new JobStore, ensuring the directory structure exists.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, JobStoreError> {
        let base_dir = base_dir.into();
        for dir in ["sources", "stores", "feature_sets", "jobs", "job_feature_sets", "snapshots"] {
            std::fs::create_dir_all(base_dir.join(dir))?;
        }
        Ok(Self { base_dir, pretty: true })
    }

    /// Write compact JSON instead of indented JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Base path for this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    // ── Sources ─────────────────────────────────────────────────

    pub fn save_source(&self, source: &Source) -> Result<(), JobStoreError> {
        self.write_json(&self.base_dir.join("sources").join(key_filename(&source.id)), source)
    }

    pub fn load_source(&self, key: &SourceRef) -> Result<Option<Source>, JobStoreError> {
        self.read_json(&self.base_dir.join("sources").join(key_filename(key.as_str())))
    }

    // ── Stores (sinks) ──────────────────────────────────────────

    pub fn save_store(&self, store: &Store) -> Result<(), JobStoreError> {
        self.write_json(&self.base_dir.join("stores").join(key_filename(&store.name)), store)
    }

    pub fn load_store(&self, key: &StoreRef) -> Result<Option<Store>, JobStoreError> {
        self.read_json(&self.base_dir.join("stores").join(key_filename(key.as_str())))
    }

    // ── Feature sets ────────────────────────────────────────────

    pub fn save_feature_set(&self, feature_set: &FeatureSet) -> Result<(), JobStoreError> {
        let filename = key_filename(&feature_set.reference().to_string());
        self.write_json(&self.base_dir.join("feature_sets").join(filename), feature_set)
    }

    pub fn load_feature_set(&self, key: &FeatureSetRef) -> Result<Option<FeatureSet>, JobStoreError> {
        let filename = key_filename(&key.to_string());
        self.read_json(&self.base_dir.join("feature_sets").join(filename))
    }

    // ── Helpers ─────────────────────────────────────────────────

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), JobStoreError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        std::fs::write(path, json)?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, JobStoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Keys of every `*.json` entry in `dir`, sorted.
    fn list_keys(&self, dir: &Path) -> Result<Vec<String>, JobStoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(key) = filename_key(&name.to_string_lossy()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
