/*!
Action handlers backing our SSM Automation documents. Each module implements the
contract of one automation step: a flat JSON event in, one or a few AWS calls,
an optional short poll loop, and a JSON result out. The SSM Automation service
owns step sequencing, retries between steps, and approval gating; none of that
lives here.

We created a `lib.rs` so the handler logic can be tested from the `tests`
folder and reused by the `integ` project. This crate is not meant to be used as
a library elsewhere.
!*/

#![deny(rust_2018_idioms)]

mod aws;
pub mod instance_profile;
pub mod provision;
pub mod rds_control;
pub mod resize;
pub mod snapshot;
pub mod stack_update;
pub mod standby;
pub mod volume;

use crate::aws::{AwsAsgMediator, AwsCfnMediator, AwsEc2Mediator, AwsIamMediator, AwsRdsMediator};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use structopt::StructOpt;

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

// the Args struct is defined in `lib.rs` so that every handler binary can share it
/// SSM Automation Actions
///
/// Runs one automation document step against AWS resources. Arguments can be
/// specified by environment variable, which is how the Lambda entry points
/// receive them.
///
#[derive(StructOpt, Debug)]
pub struct Args {
    /// The AWS Region in which the target resources live
    #[structopt(long, env = "AWS_REGION")]
    pub region: String,
}

/// Creates a new concrete implementation of [`Ec2Mediator`] using `rusoto`.
pub fn new_ec2(region: &str) -> Result<impl Ec2Mediator> {
    Ok(AwsEc2Mediator::new(region)?)
}

/// Creates a new concrete implementation of [`AsgMediator`] using `rusoto`.
pub fn new_asg(region: &str) -> Result<impl AsgMediator> {
    Ok(AwsAsgMediator::new(region)?)
}

/// Creates a new concrete implementation of [`IamMediator`] using `rusoto`.
pub fn new_iam(region: &str) -> Result<impl IamMediator> {
    Ok(AwsIamMediator::new(region)?)
}

/// Creates a new concrete implementation of [`RdsMediator`] using `rusoto`.
pub fn new_rds(region: &str) -> Result<impl RdsMediator> {
    Ok(AwsRdsMediator::new(region)?)
}

/// Creates a new concrete implementation of [`CfnMediator`] using `rusoto`.
pub fn new_cfn(region: &str) -> Result<impl CfnMediator> {
    Ok(AwsCfnMediator::new(region)?)
}

// a newly created EBS snapshot will be mapped to this
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDetails {
    // id of the snapshot being created
    pub snapshot_id: String,
    // when snapshot creation was initiated
    pub start_time: Option<DateTime<Utc>>,
}

// an IAM instance profile will be mapped to this
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDetails {
    // instance profile name
    pub name: String,
    // instance profile ARN
    pub arn: String,
    // names of the roles attached to the profile
    pub role_names: Vec<String>,
}

/// Introducing a trait abstraction over the EC2 API allows us to mock the API and write tests
/// without going to the extremely low level of `rusoto_mock`. That is, we can mock the higher
/// level use-cases of what we might send and receive to/from the API instead of mocking the API
/// itself.
#[async_trait]
pub trait Ec2Mediator {
    /// Starts an EBS snapshot of the given volume.
    async fn create_snapshot(&self, volume_id: &str, description: &str)
        -> Result<SnapshotDetails>;

    /// Deletes an EBS snapshot.
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()>;

    /// Copies a snapshot from another region, returning the new snapshot id.
    async fn copy_snapshot(
        &self,
        snapshot_id: &str,
        source_region: &str,
        description: &str,
    ) -> Result<String>;

    /// Changes the instance type of a (stopped) instance.
    async fn modify_instance_type(&self, instance_id: &str, instance_type: &str) -> Result<()>;

    /// Begins detaching an EBS volume from its instance.
    async fn detach_volume(&self, volume_id: &str) -> Result<()>;

    /// Current attachment state of a volume, `None` when the volume has no attachments left.
    async fn volume_attachment_state(&self, volume_id: &str) -> Result<Option<String>>;

    /// The id of the instance profile association for an instance, if any.
    async fn instance_profile_association(&self, instance_id: &str) -> Result<Option<String>>;

    /// Removes an instance profile association.
    async fn disassociate_instance_profile(&self, association_id: &str) -> Result<()>;

    /// Associates an instance profile with an instance, returning the association id.
    async fn associate_instance_profile(
        &self,
        profile_name: &str,
        profile_arn: &str,
        instance_id: &str,
    ) -> Result<String>;

    /// Finds a security group by name within a VPC, returning its group id.
    async fn find_security_group(&self, vpc_id: &str, group_name: &str)
        -> Result<Option<String>>;

    /// Creates a security group in a VPC, returning the new group id.
    async fn create_security_group(&self, vpc_id: &str, group_name: &str) -> Result<String>;

    /// Opens one TCP port of a security group to the given CIDR block.
    async fn authorize_ingress(&self, group_id: &str, port: i64, cidr: &str) -> Result<()>;

    /// Deletes a security group.
    async fn delete_security_group(&self, group_id: &str) -> Result<()>;

    /// The default-for-AZ subnet of the given VPC, if one exists.
    async fn default_subnet_for_vpc(&self, vpc_id: &str) -> Result<Option<String>>;
}

/// Trait abstraction over the Auto Scaling API, see [`Ec2Mediator`] for the rationale.
#[async_trait]
pub trait AsgMediator {
    /// The name of the Auto Scaling group an instance belongs to, `None` when it is unmanaged.
    async fn auto_scaling_group_for(&self, instance_id: &str) -> Result<Option<String>>;

    /// Moves an instance into the Standby lifecycle state.
    async fn enter_standby(&self, instance_id: &str, group_name: &str, decrement: bool)
        -> Result<()>;

    /// Moves an instance out of the Standby lifecycle state.
    async fn exit_standby(&self, instance_id: &str, group_name: &str) -> Result<()>;
}

/// Trait abstraction over the IAM API, see [`Ec2Mediator`] for the rationale.
#[async_trait]
pub trait IamMediator {
    /// The first instance profile attached to a role, if any.
    async fn instance_profile_for_role(&self, role_name: &str) -> Result<Option<ProfileDetails>>;

    /// Looks up an instance profile by name, `None` when no such profile exists.
    async fn get_instance_profile(&self, name: &str) -> Result<Option<ProfileDetails>>;

    /// Creates an instance profile with path `/`.
    async fn create_instance_profile(&self, name: &str) -> Result<ProfileDetails>;

    /// Adds a role to an instance profile.
    async fn add_role_to_instance_profile(&self, profile_name: &str, role_name: &str)
        -> Result<()>;

    /// Removes a role from an instance profile.
    async fn remove_role_from_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> Result<()>;

    /// Creates a role with the given assume-role policy document.
    async fn create_role(&self, name: &str, assume_role_policy: &str) -> Result<()>;

    /// Attaches a managed policy to a role.
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// ARNs of the managed policies attached to a role.
    async fn list_attached_role_policies(&self, role_name: &str) -> Result<Vec<String>>;

    /// Detaches a managed policy from a role.
    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// Deletes an instance profile.
    async fn delete_instance_profile(&self, name: &str) -> Result<()>;

    /// Deletes a role.
    async fn delete_role(&self, name: &str) -> Result<()>;
}

/// Trait abstraction over the RDS API, see [`Ec2Mediator`] for the rationale.
#[async_trait]
pub trait RdsMediator {
    /// Current status of a DB instance, e.g. `available` or `rebooting`.
    async fn db_instance_status(&self, instance_id: &str) -> Result<String>;

    /// Reboots a DB instance.
    async fn reboot_db_instance(&self, instance_id: &str) -> Result<()>;
}

/// Trait abstraction over the CloudFormation API, see [`Ec2Mediator`] for the rationale.
#[async_trait]
pub trait CfnMediator {
    /// Starts a stack update from a template URL with `CAPABILITY_IAM`.
    async fn update_stack(&self, stack_name: &str, template_url: &str) -> Result<()>;

    /// Current status of a stack, e.g. `CREATE_COMPLETE` or `DELETE_IN_PROGRESS`.
    async fn stack_status(&self, stack_name: &str) -> Result<String>;
}
