//! Starts a CloudFormation stack update from a template URL. Used by the
//! update-with-approval workflow after the approval step has passed.

use crate::CfnMediator;
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateStackEvent {
    pub stack_name: String,
    pub template_url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateStackOutcome {
    pub stack_name: String,
}

pub async fn update_stack(
    event: UpdateStackEvent,
    cfn: &impl CfnMediator,
) -> Result<UpdateStackOutcome> {
    info!(
        "Updating stack {} from {}",
        event.stack_name, event.template_url
    );
    cfn.update_stack(&event.stack_name, &event.template_url)
        .await
        .context(UpdateStack {
            stack_name: event.stack_name.clone(),
        })?;
    Ok(UpdateStackOutcome {
        stack_name: event.stack_name,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to update stack {}: {}", stack_name, source))]
    UpdateStack {
        stack_name: String,
        source: crate::Error,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
