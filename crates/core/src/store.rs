use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::snapshot::StoreSnapshot;

/// Non-owning reference to a [`Store`], by store name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreRef(String);

impl StoreRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreKind {
    Redis,
    RedisCluster,
    BigQuery,
    Cassandra,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Redis => write!(f, "REDIS"),
            StoreKind::RedisCluster => write!(f, "REDIS_CLUSTER"),
            StoreKind::BigQuery => write!(f, "BIG_QUERY"),
            StoreKind::Cassandra => write!(f, "CASSANDRA"),
        }
    }
}

/// Decoded, kind-specific store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreConfig {
    Redis {
        host: String,
        port: u16,
    },
    RedisCluster {
        connection_string: String,
    },
    BigQuery {
        project_id: String,
        dataset_id: String,
    },
    Cassandra {
        bootstrap_hosts: String,
        port: u16,
        keyspace: String,
    },
}

impl StoreConfig {
    pub fn kind(&self) -> StoreKind {
        match self {
            StoreConfig::Redis { .. } => StoreKind::Redis,
            StoreConfig::RedisCluster { .. } => StoreKind::RedisCluster,
            StoreConfig::BigQuery { .. } => StoreKind::BigQuery,
            StoreConfig::Cassandra { .. } => StoreKind::Cassandra,
        }
    }
}

/// Feature sets a store accepts, matched by project and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub project: String,
    pub name: String,
}

/// Destination that a job writes ingested features into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub kind: StoreKind,
    pub config_json: String,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Store {
    pub fn new(name: impl Into<String>, config: &StoreConfig) -> Self {
        Self {
            name: name.into(),
            kind: config.kind(),
            config_json: serde_json::json!(config).to_string(),
            subscriptions: Vec::new(),
        }
    }

    pub fn redis(name: impl Into<String>, host: &str, port: u16) -> Self {
        Self::new(
            name,
            &StoreConfig::Redis {
                host: host.to_string(),
                port,
            },
        )
    }

    pub fn with_subscription(mut self, project: &str, name: &str) -> Self {
        self.subscriptions.push(Subscription {
            project: project.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> StoreRef {
        StoreRef::new(self.name.clone())
    }

    /// Decode the stored config, rejecting one written for a different kind.
    pub fn config(&self) -> Result<StoreConfig, DecodeError> {
        let config: StoreConfig = serde_json::from_str(&self.config_json)
            .map_err(|e| DecodeError::json("store", &self.name, e))?;
        if config.kind() != self.kind {
            return Err(DecodeError::KindMismatch {
                entity: "store",
                key: self.name.clone(),
                expected: self.kind.to_string(),
                found: config.kind().to_string(),
            });
        }
        Ok(config)
    }

    pub fn to_external(&self) -> Result<StoreSnapshot, DecodeError> {
        Ok(StoreSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            config: self.config()?,
            subscriptions: self.subscriptions.clone(),
        })
    }
}
