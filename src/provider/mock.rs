//! In-memory RDS double for testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;

use super::{Cluster, ClusterStatus, Deletion, Page, RdsApi, Snapshot, SnapshotStatus};
use crate::errors::{BackupError, Result};

fn mock_failure(operation: &'static str, detail: &str) -> BackupError {
    BackupError::provider(operation, io::Error::other(format!("mock {}", detail)))
}

/// Paginates over the current contents so deletions show up in later listings.
fn paginate<T: Clone>(items: &[T], page_size: usize, marker: Option<String>) -> Page<T> {
    let start: usize = marker.and_then(|m| m.parse().ok()).unwrap_or(0);
    let end = (start + page_size).min(items.len());
    let next_marker = (end < items.len()).then(|| end.to_string());
    Page {
        items: items[start.min(end)..end].to_vec(),
        next_marker,
    }
}

pub fn snapshot_at(id: &str, created_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        id: id.to_string(),
        status: SnapshotStatus::Available,
        created_at: Some(created_at),
        cluster_id: Some("pac-aurora-staging-cluster".to_string()),
    }
}

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 3, day, hour, 0, 0).unwrap()
}

pub struct MockRds {
    page_size: usize,
    clusters: RwLock<Vec<Cluster>>,
    snapshots: RwLock<Vec<Snapshot>>,
    snapshot_statuses: RwLock<HashMap<String, VecDeque<Option<SnapshotStatus>>>>,
    cluster_statuses: RwLock<HashMap<String, VecDeque<Option<ClusterStatus>>>>,
    fail_cluster_listing: RwLock<bool>,
    fail_snapshot_listing: RwLock<bool>,
    fail_create: RwLock<bool>,
    fail_delete: RwLock<HashSet<String>>,
    created: RwLock<Vec<(String, String)>>,
    deleted: RwLock<Vec<String>>,
    cluster_list_calls: RwLock<usize>,
    status_calls: RwLock<usize>,
    call_log: RwLock<Vec<String>>,
}

impl MockRds {
    pub fn new(page_size: usize) -> Self {
        MockRds {
            page_size: page_size.max(1),
            clusters: RwLock::new(Vec::new()),
            snapshots: RwLock::new(Vec::new()),
            snapshot_statuses: RwLock::new(HashMap::new()),
            cluster_statuses: RwLock::new(HashMap::new()),
            fail_cluster_listing: RwLock::new(false),
            fail_snapshot_listing: RwLock::new(false),
            fail_create: RwLock::new(false),
            fail_delete: RwLock::new(HashSet::new()),
            created: RwLock::new(Vec::new()),
            deleted: RwLock::new(Vec::new()),
            cluster_list_calls: RwLock::new(0),
            status_calls: RwLock::new(0),
            call_log: RwLock::new(Vec::new()),
        }
    }

    pub async fn add_cluster(&self, id: &str) {
        self.clusters.write().await.push(Cluster {
            id: id.to_string(),
            status: ClusterStatus::Available,
        });
    }

    pub async fn add_snapshot(&self, snapshot: Snapshot) {
        self.snapshots.write().await.push(snapshot);
    }

    /// Queues the answers `snapshot_status` gives for `id`, in order.
    pub async fn script_snapshot_status(&self, id: &str, statuses: Vec<Option<SnapshotStatus>>) {
        self.snapshot_statuses
            .write()
            .await
            .insert(id.to_string(), statuses.into());
    }

    pub async fn script_cluster_status(&self, id: &str, statuses: Vec<Option<ClusterStatus>>) {
        self.cluster_statuses
            .write()
            .await
            .insert(id.to_string(), statuses.into());
    }

    pub async fn set_fail_cluster_listing(&self, fail: bool) {
        *self.fail_cluster_listing.write().await = fail;
    }

    pub async fn set_fail_snapshot_listing(&self, fail: bool) {
        *self.fail_snapshot_listing.write().await = fail;
    }

    pub async fn set_fail_create(&self, fail: bool) {
        *self.fail_create.write().await = fail;
    }

    pub async fn fail_delete_of(&self, id: &str) {
        self.fail_delete.write().await.insert(id.to_string());
    }

    pub async fn created(&self) -> Vec<(String, String)> {
        self.created.read().await.clone()
    }

    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    pub async fn remaining_snapshot_ids(&self) -> Vec<String> {
        self.snapshots
            .read()
            .await
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    pub async fn cluster_list_calls(&self) -> usize {
        *self.cluster_list_calls.read().await
    }

    pub async fn status_calls(&self) -> usize {
        *self.status_calls.read().await
    }

    /// Every per-snapshot call in arrival order, as `operation:id`.
    pub async fn call_log(&self) -> Vec<String> {
        self.call_log.read().await.clone()
    }

    async fn log_call(&self, operation: &str, id: &str) {
        self.call_log.write().await.push(format!("{}:{}", operation, id));
    }
}

#[async_trait]
impl RdsApi for MockRds {
    async fn list_clusters(&self, marker: Option<String>) -> Result<Page<Cluster>> {
        *self.cluster_list_calls.write().await += 1;
        if *self.fail_cluster_listing.read().await {
            return Err(mock_failure("DescribeDBClusters", "cluster listing failure"));
        }
        let clusters = self.clusters.read().await;
        Ok(paginate(clusters.as_slice(), self.page_size, marker))
    }

    async fn list_snapshots(&self, marker: Option<String>) -> Result<Page<Snapshot>> {
        if *self.fail_snapshot_listing.read().await {
            return Err(mock_failure(
                "DescribeDBClusterSnapshots",
                "snapshot listing failure",
            ));
        }
        let snapshots = self.snapshots.read().await;
        Ok(paginate(snapshots.as_slice(), self.page_size, marker))
    }

    async fn create_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> Result<()> {
        self.log_call("create", snapshot_id).await;
        if cluster_id.is_empty() || snapshot_id.is_empty() || *self.fail_create.read().await {
            return Err(mock_failure("CreateDBClusterSnapshot", "invalid parameter"));
        }
        self.created
            .write()
            .await
            .push((cluster_id.to_string(), snapshot_id.to_string()));
        self.snapshots.write().await.push(Snapshot {
            id: snapshot_id.to_string(),
            status: SnapshotStatus::Creating,
            created_at: None,
            cluster_id: Some(cluster_id.to_string()),
        });
        Ok(())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<Deletion> {
        self.log_call("delete", snapshot_id).await;
        if self.fail_delete.read().await.contains(snapshot_id) {
            return Err(mock_failure("DeleteDBClusterSnapshot", "delete failure"));
        }
        self.deleted.write().await.push(snapshot_id.to_string());
        let mut snapshots = self.snapshots.write().await;
        let before = snapshots.len();
        snapshots.retain(|s| s.id != snapshot_id);
        if snapshots.len() == before {
            Ok(Deletion::AlreadyGone)
        } else {
            Ok(Deletion::Started)
        }
    }

    async fn snapshot_status(&self, snapshot_id: &str) -> Result<Option<SnapshotStatus>> {
        *self.status_calls.write().await += 1;
        self.log_call("status", snapshot_id).await;
        if let Some(script) = self.snapshot_statuses.write().await.get_mut(snapshot_id) {
            if let Some(next) = script.pop_front() {
                return Ok(next);
            }
        }
        Ok(self
            .snapshots
            .read()
            .await
            .iter()
            .find(|s| s.id == snapshot_id)
            .map(|s| s.status.clone()))
    }

    async fn cluster_status(&self, cluster_id: &str) -> Result<Option<ClusterStatus>> {
        *self.status_calls.write().await += 1;
        if let Some(script) = self.cluster_statuses.write().await.get_mut(cluster_id) {
            if let Some(next) = script.pop_front() {
                return Ok(next);
            }
        }
        Ok(self
            .clusters
            .read()
            .await
            .iter()
            .find(|c| c.id == cluster_id)
            .map(|c| c.status.clone()))
    }
}
