// aurora-backup/src/backup/lifecycle.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::locator;
use super::poller::{Expectation, NotFound, PollResult, Settled, StatusPoller};
use crate::errors::Result;
use crate::provider::{ClusterStatus, Deletion, RdsApi, Snapshot, SnapshotStatus};

/// Timestamp suffix of snapshot identifiers. Lexicographic order is chronological.
pub const SNAPSHOT_ID_DATE_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

const SNAPSHOT: &str = "DB cluster snapshot";
const CLUSTER: &str = "DB cluster";

pub type Clock = fn() -> DateTime<Utc>;

/// Builds `{prefix}-{YYYY-MM-DD-HH-MM-SS}`.
pub fn snapshot_id(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, at.format(SNAPSHOT_ID_DATE_FORMAT))
}

/// Creates and deletes cluster snapshots and waits for each to settle.
pub struct SnapshotLifecycle {
    rds: Arc<dyn RdsApi>,
    poller: StatusPoller,
    clock: Clock,
}

impl SnapshotLifecycle {
    pub fn new(rds: Arc<dyn RdsApi>, poller: StatusPoller) -> Self {
        SnapshotLifecycle {
            rds,
            poller,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Requests a snapshot of `cluster_id` and returns the derived identifier.
    /// The identifier comes from the clock, not from the provider response.
    pub async fn create(&self, cluster_id: &str, snapshot_id_prefix: &str) -> Result<String> {
        let snapshot_id = snapshot_id(snapshot_id_prefix, (self.clock)());
        info!(cluster_id, snapshot_id = %snapshot_id, "Requesting DB cluster snapshot");
        self.rds.create_snapshot(cluster_id, &snapshot_id).await?;
        Ok(snapshot_id)
    }

    /// Waits until the snapshot is `available`. Disappearing is an error.
    pub async fn confirm_created(&self, snapshot_id: &str) -> Result<PollResult<SnapshotStatus>> {
        let expectation = Expectation {
            resource: SNAPSHOT,
            in_progress: vec![SnapshotStatus::Creating],
            success: SnapshotStatus::Available,
            not_found: NotFound::Fatal,
        };
        let result = self
            .poller
            .poll_until_settled(snapshot_id, &expectation, || self.rds.snapshot_status(snapshot_id))
            .await?;
        info!(snapshot_id, attempts = result.attempts, "DB cluster snapshot is available");
        Ok(result)
    }

    /// Every manual snapshot whose identifier starts with `snapshot_id_prefix`.
    pub async fn list_matching(&self, snapshot_id_prefix: &str) -> Result<Vec<Snapshot>> {
        locator::find_all(snapshot_id_prefix, |marker| self.rds.list_snapshots(marker)).await
    }

    /// Requests deletion. A snapshot that is already gone counts as deleted.
    pub async fn delete(&self, snapshot_id: &str) -> Result<Deletion> {
        info!(snapshot_id, "Deleting DB cluster snapshot");
        let deletion = self.rds.delete_snapshot(snapshot_id).await?;
        if deletion == Deletion::AlreadyGone {
            warn!(snapshot_id, "DB cluster snapshot was already gone");
        }
        Ok(deletion)
    }

    /// Waits until the snapshot reports `deleted` or no longer exists.
    pub async fn confirm_deleted(&self, snapshot_id: &str) -> Result<PollResult<SnapshotStatus>> {
        let expectation = Expectation {
            resource: SNAPSHOT,
            in_progress: vec![SnapshotStatus::Deleting],
            success: SnapshotStatus::Deleted,
            not_found: NotFound::Success,
        };
        let result = self
            .poller
            .poll_until_settled(snapshot_id, &expectation, || self.rds.snapshot_status(snapshot_id))
            .await?;
        match result.settled {
            Settled::Gone => info!(snapshot_id, attempts = result.attempts, "DB cluster snapshot no longer listed"),
            Settled::Reached(_) => info!(snapshot_id, attempts = result.attempts, "DB cluster snapshot deleted"),
        }
        Ok(result)
    }

    /// Waits for the cluster to leave its transitional states before a
    /// snapshot is requested. RDS rejects snapshots of a busy cluster.
    pub async fn await_cluster_available(&self, cluster_id: &str) -> Result<PollResult<ClusterStatus>> {
        let expectation = Expectation {
            resource: CLUSTER,
            in_progress: vec![
                ClusterStatus::Creating,
                ClusterStatus::BackingUp,
                ClusterStatus::Modifying,
            ],
            success: ClusterStatus::Available,
            not_found: NotFound::Fatal,
        };
        info!(cluster_id, "Waiting for DB cluster to be available");
        self.poller
            .poll_until_settled(cluster_id, &expectation, || self.rds.cluster_status(cluster_id))
            .await
    }
}
