//! Detaches an EBS volume and waits for the detachment to settle.

use crate::Ec2Mediator;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::time::Duration;

// number of attachment state polls before giving up, one per second
const DETACH_POLL_LIMIT: u32 = 35;
const DETACH_POLL_INTERVAL: Duration = Duration::from_secs(1);

// attachment states reported by the EC2 API
const STATE_DETACHING: &str = "detaching";
const STATE_DETACHED: &str = "detached";
const STATE_BUSY: &str = "busy";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DetachVolumeEvent {
    pub volume_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DetachVolumeOutcome {
    pub volume_id: String,
    pub attachment_state: String,
}

/// Detaches the volume from its instance and polls the attachment state until the
/// volume reports `detached`, reports `busy`, or the poll budget runs out.
///
/// A `busy` volume is still mounted inside the instance; EC2 will finish the
/// detachment once the guest unmounts it, but the step fails so the workflow
/// surfaces the condition instead of carrying on with an attached volume.
pub async fn detach_volume(
    event: DetachVolumeEvent,
    ec2: &impl Ec2Mediator,
) -> Result<DetachVolumeOutcome> {
    let volume_id = &event.volume_id;
    ec2.detach_volume(volume_id)
        .await
        .context(Detach { volume_id })?;

    let mut attachment_state = STATE_DETACHING.to_string();
    for attempt in 1..=DETACH_POLL_LIMIT {
        attachment_state = match ec2
            .volume_attachment_state(volume_id)
            .await
            .context(PollAttachment { volume_id })?
        {
            // no attachments left at all
            None => STATE_DETACHED.to_string(),
            Some(state) => state,
        };
        if attachment_state == STATE_DETACHED || attachment_state == STATE_BUSY {
            break;
        }
        info!(
            "Current attachment state: {}, tries: {}",
            attachment_state, attempt
        );
        tokio::time::sleep(DETACH_POLL_INTERVAL).await;
    }
    info!("Last attachment state: {}", attachment_state);

    if attachment_state == STATE_BUSY {
        warn!("Volume still mounted. Will detach once volume is unmounted from instance.");
        return VolumeBusy { volume_id }.fail();
    }
    snafu::ensure!(
        attachment_state == STATE_DETACHED,
        StillAttached {
            volume_id,
            attachment_state
        }
    );
    Ok(DetachVolumeOutcome {
        volume_id: event.volume_id,
        attachment_state,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to detach volume {}: {}", volume_id, source))]
    Detach {
        volume_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to poll attachment state of {}: {}", volume_id, source))]
    PollAttachment {
        volume_id: String,
        source: crate::Error,
    },

    #[snafu(display(
        "Failed to detach volume {}. Current state is: {}",
        volume_id,
        attachment_state
    ))]
    StillAttached {
        volume_id: String,
        attachment_state: String,
    },

    #[snafu(display(
        "Volume {} still mounted. Will detach once volume is unmounted from instance.",
        volume_id
    ))]
    VolumeBusy { volume_id: String },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
