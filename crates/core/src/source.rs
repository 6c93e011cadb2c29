use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::snapshot::SourceSnapshot;

/// Non-owning reference to a [`Source`], by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Kafka,
}

/// Decoded source connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceConfig {
    Kafka {
        bootstrap_servers: String,
        topic: String,
    },
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Kafka { .. } => SourceKind::Kafka,
        }
    }
}

/// Origin of the feature rows a job ingests.
///
/// The connection settings are kept in their stored form and only decoded
/// when the source is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub kind: SourceKind,
    pub config_json: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Source {
    pub fn new(id: impl Into<String>, config: &SourceConfig) -> Self {
        Self {
            id: id.into(),
            kind: config.kind(),
            config_json: serde_json::json!(config).to_string(),
            is_default: false,
        }
    }

    pub fn kafka(id: impl Into<String>, bootstrap_servers: &str, topic: &str) -> Self {
        Self::new(
            id,
            &SourceConfig::Kafka {
                bootstrap_servers: bootstrap_servers.to_string(),
                topic: topic.to_string(),
            },
        )
    }

    pub fn reference(&self) -> SourceRef {
        SourceRef::new(self.id.clone())
    }

    pub fn config(&self) -> Result<SourceConfig, DecodeError> {
        serde_json::from_str(&self.config_json).map_err(|e| DecodeError::json("source", &self.id, e))
    }

    pub fn to_external(&self) -> Result<SourceSnapshot, DecodeError> {
        let config = self.config()?;
        Ok(SourceSnapshot {
            id: self.id.clone(),
            kind: config.kind(),
            config,
        })
    }
}
