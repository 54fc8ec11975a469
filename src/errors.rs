// aurora-backup/src/errors.rs
use std::fmt;
use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("{resource} not found with identifier prefix {prefix}")]
    NotFound { resource: &'static str, prefix: String },

    #[error("{resource} {identifier} not found")]
    Gone {
        resource: &'static str,
        identifier: String,
    },

    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: BoxedCause,
    },

    #[error("unexpected {resource} status {status} for {identifier}")]
    UnexpectedStatus {
        resource: &'static str,
        identifier: String,
        status: String,
    },

    #[error("check for {resource} {identifier} timed out after {attempts} attempts")]
    PollTimeout {
        resource: &'static str,
        identifier: String,
        attempts: u32,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackupError {
    /// Wraps a transport or API failure raised by `operation`.
    pub fn provider<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BackupError::Provider {
            operation,
            source: Box::new(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

/// The step of a top-level operation that was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPhase {
    LocatingCluster,
    AwaitingCluster,
    CreatingSnapshot,
    ConfirmingCreation,
    ListingSnapshots,
}

impl fmt::Display for BackupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackupPhase::LocatingCluster => "locating DB cluster",
            BackupPhase::AwaitingCluster => "waiting for DB cluster to be available",
            BackupPhase::CreatingSnapshot => "creating DB cluster snapshot",
            BackupPhase::ConfirmingCreation => "confirming DB cluster snapshot creation",
            BackupPhase::ListingSnapshots => "listing DB cluster snapshots for cleanup",
        };
        f.write_str(label)
    }
}

/// A top-level failure: which phase stopped and why.
#[derive(Error, Debug)]
#[error("{phase} failed: {source}")]
pub struct PhaseError {
    pub phase: BackupPhase,
    #[source]
    pub source: BackupError,
}

impl PhaseError {
    pub fn new(phase: BackupPhase, source: BackupError) -> Self {
        PhaseError { phase, source }
    }
}
