/*!
Test harness for the automation documents in this repository. It deploys a
CloudFormation stack with the resources a document needs, uploads the document,
starts an automation execution against those resources and polls it to its
conclusion, then tears everything down again.

The harness talks to AWS through a single [`Mediator`] trait so the polling and
orchestration logic can be tested against mocks. The `main` binary wires the
trait to `rusoto` clients.
!*/

#![deny(rust_2018_idioms)]

mod aws;
pub mod document;
pub mod graph;
pub mod stack;
pub mod subnet;

use crate::aws::AwsMediator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// An opaque error type to wrap more detailed error types. The inner type provides the message.
#[derive(Debug)]
pub struct Error(Box<dyn std::error::Error + Send + Sync + 'static>);
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new opaque error.
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(source.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// implement std::error::Error to support Error type as source for snafu
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self)
    }
}

/// Creates a new concrete implementation of [`Mediator`] using `rusoto`.
pub fn new_mediator(region: &str) -> Result<impl Mediator> {
    Ok(AwsMediator::new(region)?)
}

// a stack listed by `list_stacks` will be mapped to this
#[derive(Debug, Clone, PartialEq)]
pub struct StackSummaryInfo {
    pub stack_name: String,
    pub stack_status: String,
}

// the STS caller will be mapped to this
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    // the AWS account number
    pub account: String,
    // ARN of the calling user or role
    pub arn: String,
}

// a subnet listed by `describe_subnets` will be mapped to this
#[derive(Debug, Clone, PartialEq)]
pub struct SubnetInfo {
    pub subnet_id: String,
    pub state: String,
}

/// Trait abstraction over the AWS APIs the harness touches. Mapping responses into
/// small owned structs keeps the orchestration logic mockable without dropping to
/// the level of `rusoto_mock`.
#[async_trait]
pub trait Mediator {
    /// Starts creating a stack from a template body with `CAPABILITY_IAM`.
    async fn create_stack(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
    ) -> Result<()>;

    /// Current status of a stack, e.g. `CREATE_IN_PROGRESS`.
    async fn stack_status(&self, stack_name: &str) -> Result<String>;

    /// The outputs of a stack as a key/value map.
    async fn stack_outputs(&self, stack_name: &str) -> Result<HashMap<String, String>>;

    /// All stack summaries in the region, following pagination.
    async fn list_stack_summaries(&self) -> Result<Vec<StackSummaryInfo>>;

    /// Starts deleting a stack.
    async fn delete_stack(&self, stack_name: &str) -> Result<()>;

    /// Uploads an SSM document.
    async fn create_document(&self, name: &str, content: &str, document_type: &str)
        -> Result<()>;

    /// Current status of a document, e.g. `Creating` or `Active`.
    async fn document_status(&self, name: &str) -> Result<String>;

    /// Names of the documents matching a name filter.
    async fn list_document_names(&self, name: &str) -> Result<Vec<String>>;

    /// Deletes an SSM document.
    async fn delete_document(&self, name: &str) -> Result<()>;

    /// Starts an automation execution, returning the execution id.
    async fn start_automation(
        &self,
        document_name: &str,
        parameters: &HashMap<String, Vec<String>>,
    ) -> Result<String>;

    /// Current status of an automation execution, e.g. `InProgress` or `Success`.
    async fn automation_status(&self, execution_id: &str) -> Result<String>;

    /// Sends the `Approve` signal to an automation execution parked on an approval step.
    async fn send_approval_signal(&self, execution_id: &str) -> Result<()>;

    /// The instance state name of every listed instance, including stopped ones.
    async fn instance_state_names(&self, instance_ids: &[String]) -> Result<Vec<String>>;

    /// Account number and ARN of the credentials the harness runs with.
    async fn caller_identity(&self) -> Result<CallerIdentity>;

    /// Names of all IAM roles in the account, following pagination.
    async fn list_role_names(&self) -> Result<Vec<String>>;

    /// Creates an SNS topic, returning its ARN. Creation is idempotent by name.
    async fn create_topic(&self, name: &str) -> Result<String>;

    /// Deletes an SNS topic.
    async fn delete_topic(&self, topic_arn: &str) -> Result<()>;

    /// Ids of the default VPCs in the region.
    async fn default_vpc_ids(&self) -> Result<Vec<String>>;

    /// The subnets of a VPC.
    async fn subnets_for_vpc(&self, vpc_id: &str) -> Result<Vec<SubnetInfo>>;
}
