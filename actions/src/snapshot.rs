//! EBS snapshot steps: create a snapshot of a volume, delete a snapshot, and copy a
//! snapshot across regions.

use crate::{Ec2Mediator, SnapshotDetails};
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSnapshotEvent {
    pub volume_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSnapshotOutcome {
    pub snapshot_id: String,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteSnapshotEvent {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CopySnapshotEvent {
    pub snapshot_id: String,
    pub source_region: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CopySnapshotOutcome {
    pub snapshot_id: String,
}

/// Starts a snapshot of the given volume. The snapshot keeps being created after this
/// step returns; callers that need a completed snapshot poll it in a later step.
pub async fn create_snapshot(
    event: CreateSnapshotEvent,
    ec2: &impl Ec2Mediator,
) -> Result<CreateSnapshotOutcome> {
    let SnapshotDetails {
        snapshot_id,
        start_time,
    } = ec2
        .create_snapshot(&event.volume_id, &event.description)
        .await
        .context(CreateSnapshot {
            volume_id: event.volume_id,
        })?;
    info!("Started snapshot {}", snapshot_id);
    Ok(CreateSnapshotOutcome {
        snapshot_id,
        start_time,
    })
}

pub async fn delete_snapshot(
    event: DeleteSnapshotEvent,
    ec2: &impl Ec2Mediator,
) -> Result<()> {
    ec2.delete_snapshot(&event.snapshot_id)
        .await
        .context(DeleteSnapshot {
            snapshot_id: event.snapshot_id,
        })?;
    Ok(())
}

/// Copies a snapshot from `source_region` into the region this handler runs in,
/// returning the id of the new snapshot.
pub async fn copy_snapshot(
    event: CopySnapshotEvent,
    ec2: &impl Ec2Mediator,
) -> Result<CopySnapshotOutcome> {
    let snapshot_id = ec2
        .copy_snapshot(&event.snapshot_id, &event.source_region, &event.description)
        .await
        .context(CopySnapshot {
            snapshot_id: event.snapshot_id,
        })?;
    Ok(CopySnapshotOutcome { snapshot_id })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to copy snapshot {}: {}", snapshot_id, source))]
    CopySnapshot {
        snapshot_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to create snapshot of volume {}: {}", volume_id, source))]
    CreateSnapshot {
        volume_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to delete snapshot {}: {}", snapshot_id, source))]
    DeleteSnapshot {
        snapshot_id: String,
        source: crate::Error,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
