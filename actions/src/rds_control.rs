//! RDS steps: reboot a DB instance and wait for a DB instance to reach a wanted state.

use crate::RdsMediator;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::time::Duration;

const STATUS_REBOOTING: &str = "rebooting";

// how often and how long the wait step polls the DB instance status
const WAIT_POLL_LIMIT: u32 = 60;
const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RebootRdsEvent {
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RebootRdsOutcome {
    pub instance_id: String,
    /// false when the instance was already rebooting and no reboot was issued
    pub reboot_issued: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct WaitRdsEvent {
    pub instance_id: String,
    /// DB instance statuses that end the wait, e.g. `["available"]`
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct WaitRdsOutcome {
    pub instance_id: String,
    pub status: String,
}

/// Reboots the DB instance unless a reboot is already in flight.
pub async fn reboot_db_instance(
    event: RebootRdsEvent,
    rds: &impl RdsMediator,
) -> Result<RebootRdsOutcome> {
    let instance_id = &event.instance_id;
    let status = rds
        .db_instance_status(instance_id)
        .await
        .context(DescribeInstance { instance_id })?;
    if status == STATUS_REBOOTING {
        info!("DB instance {} is already rebooting", instance_id);
        return Ok(RebootRdsOutcome {
            instance_id: event.instance_id,
            reboot_issued: false,
        });
    }
    rds.reboot_db_instance(instance_id)
        .await
        .context(Reboot { instance_id })?;
    Ok(RebootRdsOutcome {
        instance_id: event.instance_id,
        reboot_issued: true,
    })
}

/// Polls the DB instance status every 10 seconds until it matches one of the wanted
/// states. Describe failures during the poll are logged and retried rather than
/// ending the wait; transient API errors are common while an instance reboots.
pub async fn wait_db_instance_state(
    event: WaitRdsEvent,
    rds: &impl RdsMediator,
) -> Result<WaitRdsOutcome> {
    let instance_id = &event.instance_id;
    for _ in 0..WAIT_POLL_LIMIT {
        match rds.db_instance_status(instance_id).await {
            Ok(status) if event.states.contains(&status) => {
                return Ok(WaitRdsOutcome {
                    instance_id: event.instance_id,
                    status,
                });
            }
            Ok(status) => {
                debug!("DB instance {} is {}, waiting", instance_id, status);
            }
            Err(source) => {
                warn!(
                    "Failed to describe DB instance {}, will retry: {}",
                    instance_id, source
                );
            }
        }
        tokio::time::sleep(WAIT_POLL_INTERVAL).await;
    }
    WaitTimedOut {
        instance_id,
        states: event.states.join(", "),
    }
    .fail()
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to describe DB instance {}: {}", instance_id, source))]
    DescribeInstance {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to reboot DB instance {}: {}", instance_id, source))]
    Reboot {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display(
        "Timed out waiting for DB instance {} to reach state(s) {}",
        instance_id,
        states
    ))]
    WaitTimedOut {
        instance_id: String,
        states: String,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
