//! Attaches an IAM role to a running instance by way of an instance profile,
//! creating the profile when the role does not have one yet.

use crate::{Ec2Mediator, IamMediator, ProfileDetails};
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::time::Duration;

// newly created instance profiles are not visible to EC2 immediately, so the
// association is retried with a pause in between
const ASSOCIATE_ATTEMPTS: u32 = 6;
const ASSOCIATE_RETRY_PAUSE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AttachProfileEvent {
    pub instance_id: String,
    pub role_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AttachProfileOutcome {
    pub instance_profile_name: String,
    pub arn: String,
    pub role_name: String,
    pub association_id: String,
}

/// Associates an instance profile for `role_name` with the instance, replacing any
/// existing association.
pub async fn attach_instance_profile(
    event: AttachProfileEvent,
    ec2: &impl Ec2Mediator,
    iam: &impl IamMediator,
) -> Result<AttachProfileOutcome> {
    let instance_id = &event.instance_id;
    let existing = ec2
        .instance_profile_association(instance_id)
        .await
        .context(DescribeAssociations { instance_id })?;
    if let Some(association_id) = existing {
        info!("Instance profile already attached, replacing the existing association");
        ec2.disassociate_instance_profile(&association_id)
            .await
            .context(Disassociate { instance_id })?;
    }

    let profile = find_or_create_instance_profile(&event.role_name, iam).await?;
    let association_id =
        associate_with_retry(&profile.name, &profile.arn, instance_id, ec2).await?;
    Ok(AttachProfileOutcome {
        instance_profile_name: profile.name,
        arn: profile.arn,
        role_name: event.role_name,
        association_id,
    })
}

async fn find_or_create_instance_profile(
    role_name: &str,
    iam: &impl IamMediator,
) -> Result<ProfileDetails> {
    if let Some(profile) = iam
        .instance_profile_for_role(role_name)
        .await
        .context(FindProfile { role_name })?
    {
        info!("Instance profile with role {} already exists", role_name);
        return Ok(profile);
    }
    info!("Creating instance profile for role {}", role_name);
    let profile = iam
        .create_instance_profile(role_name)
        .await
        .context(CreateProfile { role_name })?;
    iam.add_role_to_instance_profile(&profile.name, role_name)
        .await
        .context(AddRole { role_name })?;
    Ok(profile)
}

async fn associate_with_retry(
    profile_name: &str,
    profile_arn: &str,
    instance_id: &str,
    ec2: &impl Ec2Mediator,
) -> Result<String> {
    info!(
        "Associating instance profile {} to {}",
        profile_name, instance_id
    );
    let mut attempts_left = ASSOCIATE_ATTEMPTS;
    loop {
        match ec2
            .associate_instance_profile(profile_name, profile_arn, instance_id)
            .await
        {
            Ok(association_id) => return Ok(association_id),
            Err(source) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(source).context(Associate { instance_id });
                }
                info!(
                    "Unable to associate instance profile, trying again in {} sec: {}",
                    ASSOCIATE_RETRY_PAUSE.as_secs(),
                    source
                );
                tokio::time::sleep(ASSOCIATE_RETRY_PAUSE).await;
            }
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to add role {} to instance profile: {}", role_name, source))]
    AddRole {
        role_name: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to associate instance profile to {}: {}", instance_id, source))]
    Associate {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to create instance profile for role {}: {}", role_name, source))]
    CreateProfile {
        role_name: String,
        source: crate::Error,
    },

    #[snafu(display(
        "Failed to describe instance profile associations of {}: {}",
        instance_id,
        source
    ))]
    DescribeAssociations {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display(
        "Failed to remove existing instance profile association from {}: {}",
        instance_id,
        source
    ))]
    Disassociate {
        instance_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to find instance profile for role {}: {}", role_name, source))]
    FindProfile {
        role_name: String,
        source: crate::Error,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
