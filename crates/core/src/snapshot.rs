//! External (wire) messages.
//!
//! These are what leaves the process. Field names are camelCase; status is
//! sent by name and [`IngestionJobStatus::code`] gives its stable integer.

use serde::{Deserialize, Serialize};

use crate::feature_set::{FeatureSetStatus, FieldSpec};
use crate::source::{SourceConfig, SourceKind};
use crate::status::IngestionJobStatus;
use crate::store::{StoreConfig, StoreKind, Subscription};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSnapshot {
    pub id: String,
    pub kind: SourceKind,
    pub config: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub name: String,
    pub kind: StoreKind,
    pub config: StoreConfig,
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetSnapshot {
    pub project: String,
    pub name: String,
    pub version: u32,
    pub max_age_secs: u64,
    pub entities: Vec<FieldSpec>,
    pub features: Vec<FieldSpec>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_id: Option<String>,
    pub status: FeatureSetStatus,
}

/// A job at one point in time. `feature_sets` has no defined order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: String,
    pub external_id: String,
    pub status: IngestionJobStatus,
    pub source: SourceSnapshot,
    pub store: StoreSnapshot,
    pub feature_sets: Vec<FeatureSetSnapshot>,
}

impl JobSnapshot {
    pub fn feature_set_names(&self) -> Vec<&str> {
        self.feature_sets.iter().map(|fs| fs.name.as_str()).collect()
    }
}
