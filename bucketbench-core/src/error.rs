#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::PoisonError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bucket,
    Object,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Bucket => write!(f, "Bucket"),
            ResourceKind::Object => write!(f, "Object"),
        }
    }
}

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: ResourceKind, name: String },

    #[error("Bucket is not empty: {0}")]
    BucketNotEmpty(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Store mutex is poisoned.")]
    PoisonData,

    #[error("Backend request failed: {0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl<T> From<PoisonError<T>> for BackendError {
    fn from(_err: PoisonError<T>) -> Self {
        Self::PoisonData
    }
}

impl BackendError {
    pub fn bucket_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: ResourceKind::Bucket,
            name: name.to_string(),
        }
    }

    pub fn object_not_found(bucket: &str, key: &str) -> Self {
        Self::NotFound {
            kind: ResourceKind::Object,
            name: format!("{bucket}/{key}"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

/// Failures recorded while running a scenario.
///
/// Backend errors are converted into one of these at the session boundary. Only `Setup` and
/// `Aborted` end a scenario early; everything else is recorded and the scenario continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ScenarioError {
    #[error("Setup failed during {operation}: {reason}")]
    Setup { operation: String, reason: String },

    #[error("{operation}: {reason}")]
    NotFound { operation: String, reason: String },

    #[error("{operation} failed: {reason}")]
    Transient { operation: String, reason: String },

    #[error("Teardown of {resource} failed: {reason}")]
    Teardown { resource: String, reason: String },

    #[error("{phase} phase aborted: {reason}")]
    Aborted { phase: String, reason: String },
}

impl ScenarioError {
    pub fn setup(operation: &str, err: &BackendError) -> Self {
        Self::Setup {
            operation: operation.to_string(),
            reason: err.to_string(),
        }
    }

    /// Classify a backend error raised during the workload.
    pub fn from_backend(operation: &str, err: &BackendError) -> Self {
        let operation = operation.to_string();
        let reason = err.to_string();
        if err.is_not_found() {
            Self::NotFound { operation, reason }
        } else {
            Self::Transient { operation, reason }
        }
    }

    pub fn teardown(resource: &str, err: &BackendError) -> Self {
        Self::Teardown {
            resource: resource.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Mismatch between the bytes written to a backend and the bytes read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "mismatch", rename_all = "snake_case"))]
pub enum DataIntegrityError {
    #[error("{key}: wrote {expected} bytes but read back {actual} bytes")]
    Size {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("{key}: content differs starting at byte {offset}")]
    Content { key: String, offset: u64 },

    #[error("{key}: nothing was read back")]
    Missing { key: String },
}

impl DataIntegrityError {
    /// Byte-exact comparison of `actual` against `expected`.
    pub fn check(key: &str, expected: &[u8], actual: &[u8]) -> Result<(), Self> {
        if expected.len() != actual.len() {
            return Err(Self::Size {
                key: key.to_string(),
                expected: expected.len() as u64,
                actual: actual.len() as u64,
            });
        }

        match expected.iter().zip(actual).position(|(a, b)| a != b) {
            Some(offset) => Err(Self::Content {
                key: key.to_string(),
                offset: offset as u64,
            }),
            None => Ok(()),
        }
    }
}
