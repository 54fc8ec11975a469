// aurora-backup/src/backup/logic.rs
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::lifecycle::{Clock, SnapshotLifecycle};
use super::locator;
use super::poller::StatusPoller;
use super::retention::{PruneSummary, RetentionPruner};
use crate::errors::{BackupPhase, PhaseError};
use crate::provider::RdsApi;

/// Everything the backup flow needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct BackupSettings {
    pub cluster_id_prefix: String,
    pub snapshot_id_prefix: String,
    pub status_check_interval: Duration,
    pub status_check_attempts: u32,
    pub backups_retention: usize,
    pub wait_for_cluster: bool,
}

/// Runs the two top-level operations: take a snapshot, and prune old ones.
pub struct BackupService {
    rds: Arc<dyn RdsApi>,
    settings: BackupSettings,
    lifecycle: SnapshotLifecycle,
}

impl BackupService {
    pub fn new(rds: Arc<dyn RdsApi>, settings: BackupSettings) -> Self {
        let poller = StatusPoller::new(settings.status_check_interval, settings.status_check_attempts);
        let lifecycle = SnapshotLifecycle::new(rds.clone(), poller);
        BackupService {
            rds,
            settings,
            lifecycle,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.lifecycle = self.lifecycle.with_clock(clock);
        self
    }

    /// Locates the cluster, requests a snapshot and waits for it to be
    /// available. The first failing phase is logged once and returned.
    pub async fn make_backup(&self) -> Result<String, PhaseError> {
        let result = self.run_backup().await;
        match &result {
            Ok(snapshot_id) => {
                info!(snapshot_id = %snapshot_id, "PAC aurora backup successfully created")
            }
            Err(e) => error!(phase = %e.phase, error = %e.source, "Backup failed"),
        }
        result
    }

    async fn run_backup(&self) -> Result<String, PhaseError> {
        info!(prefix = %self.settings.cluster_id_prefix, "Getting DB cluster ID");
        let cluster = locator::find_first("DB cluster", &self.settings.cluster_id_prefix, |marker| {
            self.rds.list_clusters(marker)
        })
        .await
        .map_err(|e| PhaseError::new(BackupPhase::LocatingCluster, e))?;
        info!(cluster_id = %cluster.id, status = %cluster.status, "Found DB cluster");
        let cluster_id = cluster.id;

        if self.settings.wait_for_cluster {
            self.lifecycle
                .await_cluster_available(&cluster_id)
                .await
                .map_err(|e| PhaseError::new(BackupPhase::AwaitingCluster, e))?;
        }

        info!(cluster_id = %cluster_id, "Making snapshot for cluster");
        let snapshot_id = self
            .lifecycle
            .create(&cluster_id, &self.settings.snapshot_id_prefix)
            .await
            .map_err(|e| PhaseError::new(BackupPhase::CreatingSnapshot, e))?;

        info!(snapshot_id = %snapshot_id, "Checking for snapshot successfully created");
        self.lifecycle
            .confirm_created(&snapshot_id)
            .await
            .map_err(|e| PhaseError::new(BackupPhase::ConfirmingCreation, e))?;

        Ok(snapshot_id)
    }

    /// Prunes snapshots beyond the retention count. Only a listing failure is
    /// returned; individual deletion failures are reported in the summary.
    pub async fn clean_up_old_backups(&self) -> Result<PruneSummary, PhaseError> {
        info!(prefix = %self.settings.snapshot_id_prefix, "Getting list of snapshots to be cleaned up");
        let pruner = RetentionPruner::new(&self.lifecycle);
        match pruner
            .prune(&self.settings.snapshot_id_prefix, self.settings.backups_retention)
            .await
        {
            Ok(summary) => {
                if summary.failed.is_empty() {
                    info!(
                        matched = summary.matched,
                        deleted = summary.deleted.len(),
                        retained = summary.retained.len(),
                        "Snapshot cleanup finished"
                    );
                } else {
                    warn!(
                        deleted = summary.deleted.len(),
                        failed = summary.failed.len(),
                        "Snapshot cleanup finished with failures"
                    );
                }
                Ok(summary)
            }
            Err(e) => {
                let e = PhaseError::new(BackupPhase::ListingSnapshots, e);
                error!(phase = %e.phase, error = %e.source, "Snapshot cleanup failed");
                Err(e)
            }
        }
    }
}
