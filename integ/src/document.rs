//! Deploys an automation document, runs executions of it, and polls them to
//! their conclusion.

use crate::Mediator;
use log::info;
use snafu::{ensure, ResultExt, Snafu};
use std::collections::HashMap;
use std::time::Duration;

// document statuses that mean deployment has not concluded yet
const PENDING_DOCUMENT_STATUS: &[&str] = &["Creating", "Updating"];
// execution statuses that mean the automation has not concluded yet
const PENDING_AUTOMATION_STATUS: &[&str] = &["Pending", "InProgress"];
const STATUS_WAITING: &str = "Waiting";

const DOCUMENT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const AUTOMATION_POLL_INTERVAL: Duration = Duration::from_secs(10);
const INSTANCE_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct DocumentTester<'a> {
    aws: &'a dyn Mediator,
    doc_name: String,
    doc_type: String,
    doc_content: String,
}

impl<'a> DocumentTester<'a> {
    pub fn new(aws: &'a dyn Mediator, doc_name: &str, doc_type: &str, doc_content: &str) -> Self {
        Self {
            aws,
            doc_name: doc_name.to_string(),
            doc_type: doc_type.to_string(),
            doc_content: doc_content.to_string(),
        }
    }

    pub fn doc_name(&self) -> &str {
        &self.doc_name
    }

    /// Uploads the document and waits for its deployment to conclude, returning the
    /// final document status. A previously deployed document of the same name is
    /// deleted first.
    pub async fn create_document(&self) -> Result<String> {
        if self.document_exists().await? {
            info!("Deleting previously deployed document");
            self.destroy().await?;
        }
        self.aws
            .create_document(&self.doc_name, &self.doc_content, &self.doc_type)
            .await
            .context(CreateDocument {
                doc_name: &self.doc_name,
            })?;
        info!("Verifying document creation is complete");
        loop {
            let status = self
                .aws
                .document_status(&self.doc_name)
                .await
                .context(DescribeDocument {
                    doc_name: &self.doc_name,
                })?;
            if !PENDING_DOCUMENT_STATUS.contains(&status.as_str()) {
                return Ok(status);
            }
            info!(
                "Waiting {} seconds before checking again for document creation",
                DOCUMENT_POLL_INTERVAL.as_secs()
            );
            tokio::time::sleep(DOCUMENT_POLL_INTERVAL).await;
        }
    }

    /// True when a document of this name has been deployed previously.
    pub async fn document_exists(&self) -> Result<bool> {
        let names = self
            .aws
            .list_document_names(&self.doc_name)
            .await
            .context(ListDocuments)?;
        Ok(names.iter().any(|name| name == &self.doc_name))
    }

    /// Starts an automation execution of the document, returning the execution id.
    pub async fn execute_automation(
        &self,
        parameters: &HashMap<String, Vec<String>>,
    ) -> Result<String> {
        self.aws
            .start_automation(&self.doc_name, parameters)
            .await
            .context(StartAutomation {
                doc_name: &self.doc_name,
            })
    }

    /// Polls an automation execution until it reaches a status that is neither
    /// `Pending` nor `InProgress`, nor `Waiting` when `block_on_waiting` is set,
    /// and returns that status. The callback observes every polled status; it
    /// cannot alter the loop.
    pub async fn automation_execution_status(
        &self,
        execution_id: &str,
        block_on_waiting: bool,
        mut status_callback: Option<&mut dyn FnMut(&str)>,
    ) -> Result<String> {
        loop {
            let status = self
                .aws
                .automation_status(execution_id)
                .await
                .context(GetAutomation { execution_id })?;
            if let Some(callback) = status_callback.as_mut() {
                callback(&status);
            }
            let pending = PENDING_AUTOMATION_STATUS.contains(&status.as_str())
                || (block_on_waiting && status == STATUS_WAITING);
            if !pending {
                return Ok(status);
            }
            info!(
                "Waiting {} seconds before checking again for automation conclusion",
                AUTOMATION_POLL_INTERVAL.as_secs()
            );
            tokio::time::sleep(AUTOMATION_POLL_INTERVAL).await;
        }
    }

    /// Approves an execution parked on an approval step.
    pub async fn approve(&self, execution_id: &str) -> Result<()> {
        self.aws
            .send_approval_signal(execution_id)
            .await
            .context(Approve { execution_id })
    }

    /// Waits until none of the listed instances is in the given state.
    pub async fn ensure_no_instance_in_state(
        &self,
        state: &str,
        instance_ids: &[String],
    ) -> Result<()> {
        loop {
            let states = self
                .aws
                .instance_state_names(instance_ids)
                .await
                .context(DescribeInstances)?;
            if !states.iter().any(|name| name == state) {
                return Ok(());
            }
            info!(
                "Instance(s) still found in state {}; waiting {} seconds before checking again",
                state,
                INSTANCE_POLL_INTERVAL.as_secs()
            );
            tokio::time::sleep(INSTANCE_POLL_INTERVAL).await;
        }
    }

    /// Resolves the ARN of the automation service role, failing when the role does
    /// not exist in the account.
    pub async fn get_automation_role(&self, role_name: &str) -> Result<String> {
        let identity = self.aws.caller_identity().await.context(CallerIdentity)?;
        let roles = self.aws.list_role_names().await.context(ListRoles)?;
        ensure!(
            roles.iter().any(|name| name == role_name),
            RoleMissing { role_name }
        );
        Ok(format!("arn:aws:iam::{}:role/{}", identity.account, role_name))
    }

    /// Deletes the document.
    pub async fn destroy(&self) -> Result<()> {
        self.aws
            .delete_document(&self.doc_name)
            .await
            .context(DeleteDocument {
                doc_name: &self.doc_name,
            })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to approve automation execution {}: {}", execution_id, source))]
    Approve {
        execution_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to get caller identity: {}", source))]
    CallerIdentity { source: crate::Error },

    #[snafu(display("Failed to create document {}: {}", doc_name, source))]
    CreateDocument {
        doc_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to delete document {}: {}", doc_name, source))]
    DeleteDocument {
        doc_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to describe document {}: {}", doc_name, source))]
    DescribeDocument {
        doc_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to describe instance status: {}", source))]
    DescribeInstances { source: crate::Error },

    #[snafu(display("Failed to get automation execution {}: {}", execution_id, source))]
    GetAutomation {
        execution_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to list documents: {}", source))]
    ListDocuments { source: crate::Error },

    #[snafu(display("Failed to list roles: {}", source))]
    ListRoles { source: crate::Error },

    #[snafu(display("Automation role {} does not exist", role_name))]
    RoleMissing { role_name: String },

    #[snafu(display("Failed to start automation for {}: {}", doc_name, source))]
    StartAutomation {
        doc_name: String,
        source: crate::Error,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
