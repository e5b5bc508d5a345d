//! Moves an instance in or out of the Standby lifecycle state of its Auto Scaling group.
//! Backs the `ASGChangeStandbyState` automation document and the standby steps of the
//! patch-in-ASG workflow.

use crate::AsgMediator;
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

/// The standby transition requested by the automation step.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum StandbyState {
    EnterStandby,
    ExitStandby,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StandbyEvent {
    /// The state to transition to.
    pub state: StandbyState,
    pub instance_id: String,
    /// Whether entering standby should decrement the group's desired capacity.
    /// Ignored for `ExitStandby`.
    #[serde(default)]
    pub should_decrement: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StandbyOutcome {
    pub instance_id: String,
    pub state: StandbyState,
    /// The Auto Scaling group the instance belongs to, `None` when the instance
    /// is not managed by any group and nothing was done.
    pub auto_scaling_group: Option<String>,
}

/// Applies the requested standby transition to the instance's Auto Scaling group.
///
/// An instance that is not part of any group is left alone, matching the behavior
/// the workflows rely on when they run against mixed fleets.
pub async fn change_standby_state(
    event: StandbyEvent,
    asg: &impl AsgMediator,
) -> Result<StandbyOutcome> {
    let group_name = asg
        .auto_scaling_group_for(&event.instance_id)
        .await
        .context(DescribeInstance {
            instance_id: event.instance_id.clone(),
        })?;
    let group_name = match group_name {
        Some(group_name) => group_name,
        None => {
            info!(
                "Instance {} is not in an auto scaling group, nothing to do",
                event.instance_id
            );
            return Ok(StandbyOutcome {
                instance_id: event.instance_id,
                state: event.state,
                auto_scaling_group: None,
            });
        }
    };
    match event.state {
        StandbyState::EnterStandby => {
            info!("Enter standby: {} {}", event.instance_id, group_name);
            asg.enter_standby(&event.instance_id, &group_name, event.should_decrement)
                .await
                .context(EnterStandby {
                    instance_id: event.instance_id.clone(),
                })?;
        }
        StandbyState::ExitStandby => {
            info!("Exit standby: {} {}", event.instance_id, group_name);
            asg.exit_standby(&event.instance_id, &group_name)
                .await
                .context(ExitStandby {
                    instance_id: event.instance_id.clone(),
                })?;
        }
    }
    Ok(StandbyOutcome {
        instance_id: event.instance_id,
        state: event.state,
        auto_scaling_group: Some(group_name),
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to look up auto scaling group of {}: {}", instance_id, source))]
    DescribeInstance {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to enter standby for {}: {}", instance_id, source))]
    EnterStandby {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to exit standby for {}: {}", instance_id, source))]
    ExitStandby {
        instance_id: String,
        source: crate::Error,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
