//! Deploys and tears down the CloudFormation stack holding the resources a
//! document test runs against.

use crate::Mediator;
use log::info;
use snafu::{ensure, ResultExt, Snafu};
use std::collections::HashMap;
use std::time::Duration;

const CREATE_COMPLETE: &str = "CREATE_COMPLETE";
const CREATE_IN_PROGRESS: &str = "CREATE_IN_PROGRESS";
const DELETE_COMPLETE: &str = "DELETE_COMPLETE";

const STACK_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct StackTester<'a> {
    aws: &'a dyn Mediator,
    stack_name: String,
    template_body: String,
}

impl<'a> StackTester<'a> {
    pub fn new(aws: &'a dyn Mediator, stack_name: &str, template_body: &str) -> Self {
        Self {
            aws,
            stack_name: stack_name.to_string(),
            template_body: template_body.to_string(),
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Creates the stack and waits for its deployment to conclude, returning the
    /// stack outputs. A leftover stack of the same name is deleted first.
    pub async fn create_stack(
        &self,
        parameters: &[(String, String)],
    ) -> Result<HashMap<String, String>> {
        self.delete_stack().await?;
        info!("Creating stack {}", self.stack_name);
        self.aws
            .create_stack(&self.stack_name, &self.template_body, parameters)
            .await
            .context(CreateStack {
                stack_name: &self.stack_name,
            })?;
        while self.is_stack_in_status(CREATE_IN_PROGRESS).await? {
            info!(
                "Waiting {} seconds before checking again for successful stack creation",
                STACK_POLL_INTERVAL.as_secs()
            );
            tokio::time::sleep(STACK_POLL_INTERVAL).await;
        }
        let status = self.stack_status().await?;
        ensure!(
            status == CREATE_COMPLETE,
            StackNotCreated {
                stack_name: &self.stack_name,
                status
            }
        );
        self.aws
            .stack_outputs(&self.stack_name)
            .await
            .context(DescribeStack {
                stack_name: &self.stack_name,
            })
    }

    pub async fn is_stack_in_status(&self, status: &str) -> Result<bool> {
        Ok(self.stack_status().await? == status)
    }

    /// True when a stack of this name exists in any status short of `DELETE_COMPLETE`.
    pub async fn is_stack_present(&self) -> Result<bool> {
        let summaries = self.aws.list_stack_summaries().await.context(ListStacks)?;
        Ok(summaries.iter().any(|summary| {
            summary.stack_name == self.stack_name && summary.stack_status != DELETE_COMPLETE
        }))
    }

    /// Deletes the stack and waits for it to be gone. A no-op when no stack of this
    /// name is present.
    pub async fn delete_stack(&self) -> Result<()> {
        if !self.is_stack_present().await? {
            return Ok(());
        }
        info!("Deleting existing stack {}", self.stack_name);
        self.aws
            .delete_stack(&self.stack_name)
            .await
            .context(DeleteStack {
                stack_name: &self.stack_name,
            })?;
        while self.is_stack_present().await? {
            info!(
                "Waiting {} seconds before checking again for successful stack deletion",
                STACK_POLL_INTERVAL.as_secs()
            );
            tokio::time::sleep(STACK_POLL_INTERVAL).await;
        }
        Ok(())
    }

    async fn stack_status(&self) -> Result<String> {
        self.aws
            .stack_status(&self.stack_name)
            .await
            .context(DescribeStack {
                stack_name: &self.stack_name,
            })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to create stack {}: {}", stack_name, source))]
    CreateStack {
        stack_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to delete stack {}: {}", stack_name, source))]
    DeleteStack {
        stack_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to describe stack {}: {}", stack_name, source))]
    DescribeStack {
        stack_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to list stacks: {}", source))]
    ListStacks { source: crate::Error },

    #[snafu(display("Stack {} did not create successfully, status is {}", stack_name, status))]
    StackNotCreated { stack_name: String, status: String },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
