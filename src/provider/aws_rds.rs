// aurora-backup/src/provider/aws_rds.rs
use async_trait::async_trait;
use aws_sdk_rds as rds;
use chrono::{DateTime, Utc};
use rds::config::{BehaviorVersion, Credentials, Region};
use rds::types::{DbCluster, DbClusterSnapshot};
use tracing::debug;

use super::{Cluster, ClusterStatus, Deletion, Page, RdsApi, Snapshot, SnapshotStatus};
use crate::config::AwsConfig;
use crate::errors::{BackupError, Result};

const MANUAL_SNAPSHOTS: &str = "manual";

/// `RdsApi` backed by the AWS SDK.
pub struct AwsRds {
    client: rds::Client,
}

impl AwsRds {
    /// Builds a client for `aws.region`. Static credentials are used when both
    /// key parts are configured; otherwise the default provider chain applies.
    pub async fn connect(aws: &AwsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));
        if let Some(endpoint) = &aws.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,     // session_token
                None,     // expiry
                "Static", // provider_name
            ));
        }
        let sdk_config = loader.load().await;
        debug!(region = %aws.region, "RDS client configured");

        Self::from_client(rds::Client::new(&sdk_config))
    }

    pub fn from_client(client: rds::Client) -> Self {
        AwsRds { client }
    }
}

fn to_cluster(raw: &DbCluster) -> Option<Cluster> {
    Some(Cluster {
        id: raw.db_cluster_identifier()?.to_string(),
        status: ClusterStatus::from(raw.status().unwrap_or_default()),
    })
}

fn to_snapshot(raw: &DbClusterSnapshot) -> Option<Snapshot> {
    let created_at = raw
        .snapshot_create_time()
        .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()));
    Some(Snapshot {
        id: raw.db_cluster_snapshot_identifier()?.to_string(),
        status: SnapshotStatus::from(raw.status().unwrap_or_default()),
        created_at,
        cluster_id: raw.db_cluster_identifier().map(str::to_string),
    })
}

#[async_trait]
impl RdsApi for AwsRds {
    async fn list_clusters(&self, marker: Option<String>) -> Result<Page<Cluster>> {
        let output = self
            .client
            .describe_db_clusters()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| BackupError::provider("DescribeDBClusters", e))?;

        Ok(Page {
            items: output.db_clusters().iter().filter_map(to_cluster).collect(),
            next_marker: output.marker().map(str::to_string),
        })
    }

    async fn list_snapshots(&self, marker: Option<String>) -> Result<Page<Snapshot>> {
        let output = self
            .client
            .describe_db_cluster_snapshots()
            .snapshot_type(MANUAL_SNAPSHOTS)
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| BackupError::provider("DescribeDBClusterSnapshots", e))?;

        Ok(Page {
            items: output
                .db_cluster_snapshots()
                .iter()
                .filter_map(to_snapshot)
                .collect(),
            next_marker: output.marker().map(str::to_string),
        })
    }

    async fn create_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> Result<()> {
        self.client
            .create_db_cluster_snapshot()
            .db_cluster_identifier(cluster_id)
            .db_cluster_snapshot_identifier(snapshot_id)
            .send()
            .await
            .map_err(|e| BackupError::provider("CreateDBClusterSnapshot", e))?;
        Ok(())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<Deletion> {
        match self
            .client
            .delete_db_cluster_snapshot()
            .db_cluster_snapshot_identifier(snapshot_id)
            .send()
            .await
        {
            Ok(_) => Ok(Deletion::Started),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_db_cluster_snapshot_not_found_fault()) =>
            {
                Ok(Deletion::AlreadyGone)
            }
            Err(e) => Err(BackupError::provider("DeleteDBClusterSnapshot", e)),
        }
    }

    async fn snapshot_status(&self, snapshot_id: &str) -> Result<Option<SnapshotStatus>> {
        let output = match self
            .client
            .describe_db_cluster_snapshots()
            .db_cluster_snapshot_identifier(snapshot_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_db_cluster_snapshot_not_found_fault()) =>
            {
                return Ok(None);
            }
            Err(e) => return Err(BackupError::provider("DescribeDBClusterSnapshots", e)),
        };

        Ok(output
            .db_cluster_snapshots()
            .first()
            .map(|s| SnapshotStatus::from(s.status().unwrap_or_default())))
    }

    async fn cluster_status(&self, cluster_id: &str) -> Result<Option<ClusterStatus>> {
        let output = match self
            .client
            .describe_db_clusters()
            .db_cluster_identifier(cluster_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_db_cluster_not_found_fault()) =>
            {
                return Ok(None);
            }
            Err(e) => return Err(BackupError::provider("DescribeDBClusters", e)),
        };

        Ok(output
            .db_clusters()
            .first()
            .map(|c| ClusterStatus::from(c.status().unwrap_or_default())))
    }
}
