use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, JobError};
use crate::snapshot::FeatureSetSnapshot;

/// Non-owning reference to a [`FeatureSet`], written `project/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureSetRef {
    pub project: String,
    pub name: String,
}

impl FeatureSetRef {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for FeatureSetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project, self.name)
    }
}

impl FromStr for FeatureSetRef {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((project, name)) if !project.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(FeatureSetRef::new(project, name))
            }
            _ => Err(JobError::UnknownVariant {
                kind: "feature set reference",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Bytes,
    String,
    Int32,
    Int64,
    Double,
    Float,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub value_type: ValueType,
}

/// Decoded feature set definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSetSpec {
    pub max_age_secs: u64,
    pub entities: Vec<FieldSpec>,
    pub features: Vec<FieldSpec>,
    #[serde(default)]
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureSetStatus {
    Invalid,
    #[default]
    Pending,
    JobStarting,
    Ready,
}

/// A named group of feature definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet {
    pub project: String,
    pub name: String,
    pub version: u32,
    pub spec_json: String,
    #[serde(default)]
    pub status: FeatureSetStatus,
}

impl FeatureSet {
    pub fn new(project: impl Into<String>, name: impl Into<String>, spec: &FeatureSetSpec) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
            version: 1,
            spec_json: serde_json::json!(spec).to_string(),
            status: FeatureSetStatus::default(),
        }
    }

    pub fn reference(&self) -> FeatureSetRef {
        FeatureSetRef::new(self.project.clone(), self.name.clone())
    }

    pub fn spec(&self) -> Result<FeatureSetSpec, DecodeError> {
        serde_json::from_str(&self.spec_json)
            .map_err(|e| DecodeError::json("feature set", self.reference().to_string(), e))
    }

    pub fn to_external(&self) -> Result<FeatureSetSnapshot, DecodeError> {
        let spec = self.spec()?;
        Ok(FeatureSetSnapshot {
            project: self.project.clone(),
            name: self.name.clone(),
            version: self.version,
            max_age_secs: spec.max_age_secs,
            entities: spec.entities,
            features: spec.features,
            source_id: spec.source_id,
            status: self.status,
        })
    }
}
