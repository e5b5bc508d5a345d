//! Changes the instance type of an EC2 instance. The surrounding automation document
//! stops the instance before this step and starts it again afterwards.

use crate::Ec2Mediator;
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResizeEvent {
    pub instance_id: String,
    pub instance_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResizeOutcome {
    pub instance_id: String,
    pub instance_type: String,
}

pub async fn resize_instance(
    event: ResizeEvent,
    ec2: &impl Ec2Mediator,
) -> Result<ResizeOutcome> {
    info!(
        "Modifying instance type of {} to {}",
        event.instance_id, event.instance_type
    );
    ec2.modify_instance_type(&event.instance_id, &event.instance_type)
        .await
        .context(ModifyInstanceType {
            instance_id: event.instance_id.clone(),
        })?;
    Ok(ResizeOutcome {
        instance_id: event.instance_id,
        instance_type: event.instance_type,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to modify instance type of {}: {}", instance_id, source))]
    ModifyInstanceType {
        instance_id: String,
        source: crate::Error,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
