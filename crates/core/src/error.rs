use thiserror::Error;

use crate::status::JobStatus;

/// A collaborator's stored representation could not be rendered in its
/// external form.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to decode {entity} '{key}': {source}")]
    Json {
        entity: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{entity} '{key}' has config for {found}, expected {expected}")]
    KindMismatch {
        entity: &'static str,
        key: String,
        expected: String,
        found: String,
    },
}

impl DecodeError {
    pub(crate) fn json(entity: &'static str, key: impl Into<String>, source: serde_json::Error) -> Self {
        DecodeError::Json {
            entity,
            key: key.into(),
            source,
        }
    }

    /// Key of the entity that failed to decode.
    pub fn key(&self) -> &str {
        match self {
            DecodeError::Json { key, .. } | DecodeError::KindMismatch { key, .. } => key,
        }
    }
}

#[derive(Error, Debug)]
pub enum JobError {
    #[error("snapshot aborted: {0}")]
    Decode(#[from] DecodeError),

    #[error("{kind} not found: {key}")]
    Unresolved { kind: &'static str, key: String },

    #[error("job id must not be empty")]
    EmptyId,

    #[error("job {id} is {from} and cannot move to {to}")]
    TerminalTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("association owned by job {owner} cannot be attached to job {job_id}")]
    ForeignAssociation { job_id: String, owner: String },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl JobError {
    pub(crate) fn unresolved(kind: &'static str, key: impl std::fmt::Display) -> Self {
        JobError::Unresolved {
            kind,
            key: key.to_string(),
        }
    }
}
