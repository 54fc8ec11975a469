// aurora-backup/src/backup/retention.rs
use std::cmp::Ordering;

use tracing::{error, info};

use super::lifecycle::SnapshotLifecycle;
use crate::errors::{BackupError, Result};
use crate::provider::Snapshot;

/// What a prune pass did.
#[derive(Debug, Default)]
pub struct PruneSummary {
    pub matched: usize,
    pub retained: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<(String, BackupError)>,
}

/// Newest first. Snapshots without a provider timestamp are still being
/// stamped and count as newest; equal timestamps fall back to identifier.
fn newest_first(a: &Snapshot, b: &Snapshot) -> Ordering {
    match (&a.created_at, &b.created_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.id.cmp(&a.id))
}

/// Splits `snapshots` into (kept, to delete). The delete list is oldest first.
pub fn select_for_deletion(mut snapshots: Vec<Snapshot>, retention: usize) -> (Vec<Snapshot>, Vec<Snapshot>) {
    snapshots.sort_by(newest_first);
    let mut excess = if snapshots.len() > retention {
        snapshots.split_off(retention)
    } else {
        Vec::new()
    };
    excess.reverse();
    (snapshots, excess)
}

/// Keeps the `retention` most recent snapshots and removes the rest.
pub struct RetentionPruner<'a> {
    lifecycle: &'a SnapshotLifecycle,
}

impl<'a> RetentionPruner<'a> {
    pub fn new(lifecycle: &'a SnapshotLifecycle) -> Self {
        RetentionPruner { lifecycle }
    }

    /// Listing failures abort the pass. Each deletion is confirmed before the
    /// next one starts; a failed deletion is logged and skipped.
    pub async fn prune(&self, snapshot_id_prefix: &str, retention: usize) -> Result<PruneSummary> {
        let snapshots = self.lifecycle.list_matching(snapshot_id_prefix).await?;
        let matched = snapshots.len();
        info!(prefix = snapshot_id_prefix, matched, retention, "Listed snapshots for cleanup");

        let (kept, excess) = select_for_deletion(snapshots, retention);
        let mut summary = PruneSummary {
            matched,
            retained: kept.into_iter().map(|s| s.id).collect(),
            ..PruneSummary::default()
        };

        for snapshot in excess {
            info!(
                snapshot_id = %snapshot.id,
                cluster_id = ?snapshot.cluster_id,
                status = %snapshot.status,
                created_at = ?snapshot.created_at,
                "Deleting snapshot for cleanup"
            );
            let snapshot_id = snapshot.id;
            match self.remove(&snapshot_id).await {
                Ok(()) => {
                    info!(snapshot_id = %snapshot_id, "Deleted old snapshot for cleanup");
                    summary.deleted.push(snapshot_id);
                }
                Err(e) => {
                    error!(snapshot_id = %snapshot_id, error = %e, "Error in deleting DB cluster snapshot for cleanup");
                    summary.failed.push((snapshot_id, e));
                }
            }
        }

        Ok(summary)
    }

    async fn remove(&self, snapshot_id: &str) -> Result<()> {
        self.lifecycle.delete(snapshot_id).await?;
        self.lifecycle.confirm_deleted(snapshot_id).await?;
        Ok(())
    }
}
