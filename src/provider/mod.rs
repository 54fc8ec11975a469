// aurora-backup/src/provider/mod.rs
pub(crate) mod aws_rds;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::errors::Result;

/// Anything a prefix lookup can match on.
pub trait Identified {
    fn identifier(&self) -> &str;
}

/// One page of a paginated listing. `next_marker` is `None` on the last page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterStatus {
    Creating,
    Available,
    Deleting,
    BackingUp,
    Modifying,
    Other(String),
}

impl From<&str> for ClusterStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "creating" => ClusterStatus::Creating,
            "available" => ClusterStatus::Available,
            "deleting" => ClusterStatus::Deleting,
            "backing-up" => ClusterStatus::BackingUp,
            "modifying" => ClusterStatus::Modifying,
            other => ClusterStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterStatus::Creating => f.write_str("creating"),
            ClusterStatus::Available => f.write_str("available"),
            ClusterStatus::Deleting => f.write_str("deleting"),
            ClusterStatus::BackingUp => f.write_str("backing-up"),
            ClusterStatus::Modifying => f.write_str("modifying"),
            ClusterStatus::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    Creating,
    Available,
    Deleting,
    Deleted,
    Failed,
    Other(String),
}

impl From<&str> for SnapshotStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "creating" => SnapshotStatus::Creating,
            "available" => SnapshotStatus::Available,
            "deleting" => SnapshotStatus::Deleting,
            "deleted" => SnapshotStatus::Deleted,
            "failed" => SnapshotStatus::Failed,
            other => SnapshotStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotStatus::Creating => f.write_str("creating"),
            SnapshotStatus::Available => f.write_str("available"),
            SnapshotStatus::Deleting => f.write_str("deleting"),
            SnapshotStatus::Deleted => f.write_str("deleted"),
            SnapshotStatus::Failed => f.write_str("failed"),
            SnapshotStatus::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: String,
    pub status: ClusterStatus,
}

impl Identified for Cluster {
    fn identifier(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub status: SnapshotStatus,
    /// Provider-assigned creation time. RDS leaves it unset until the copy starts.
    pub created_at: Option<DateTime<Utc>>,
    pub cluster_id: Option<String>,
}

impl Identified for Snapshot {
    fn identifier(&self) -> &str {
        &self.id
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Started,
    AlreadyGone,
}

/// The slice of the RDS API the backup flow depends on.
///
/// Status lookups return `Ok(None)` when the provider reports the resource
/// does not exist; every other failure is a `BackupError::Provider`.
#[async_trait]
pub trait RdsApi: Send + Sync {
    async fn list_clusters(&self, marker: Option<String>) -> Result<Page<Cluster>>;

    /// Lists manual cluster snapshots only.
    async fn list_snapshots(&self, marker: Option<String>) -> Result<Page<Snapshot>>;

    async fn create_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> Result<()>;

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<Deletion>;

    async fn snapshot_status(&self, snapshot_id: &str) -> Result<Option<SnapshotStatus>>;

    async fn cluster_status(&self, cluster_id: &str) -> Result<Option<ClusterStatus>>;
}
