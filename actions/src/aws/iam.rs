use crate::{IamMediator, ProfileDetails};
use async_trait::async_trait;
use rusoto_core::RusotoError;
use rusoto_iam::{
    AddRoleToInstanceProfileRequest, AttachRolePolicyRequest, CreateInstanceProfileRequest,
    CreateRoleRequest, DeleteInstanceProfileRequest, DeleteRoleRequest, DetachRolePolicyRequest,
    GetInstanceProfileError, GetInstanceProfileRequest, Iam, IamClient,
    ListAttachedRolePoliciesRequest, ListInstanceProfilesForRoleRequest,
    RemoveRoleFromInstanceProfileRequest,
};
use snafu::{IntoError, OptionExt, ResultExt, Snafu};

/// The error type for this module.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("Failed to add role {} to instance profile {}: {}", role_name, profile_name, source))]
    AddRoleToProfile {
        profile_name: String,
        role_name: String,
        source: RusotoError<rusoto_iam::AddRoleToInstanceProfileError>,
    },

    #[snafu(display("Failed to attach policy {} to role {}: {}", policy_arn, role_name, source))]
    AttachRolePolicy {
        role_name: String,
        policy_arn: String,
        source: RusotoError<rusoto_iam::AttachRolePolicyError>,
    },

    #[snafu(display("Failed to create instance profile {}: {}", name, source))]
    CreateProfile {
        name: String,
        source: RusotoError<rusoto_iam::CreateInstanceProfileError>,
    },

    #[snafu(display("Failed to create role {}: {}", name, source))]
    CreateRole {
        name: String,
        source: RusotoError<rusoto_iam::CreateRoleError>,
    },

    #[snafu(display("Failed to delete instance profile {}: {}", name, source))]
    DeleteProfile {
        name: String,
        source: RusotoError<rusoto_iam::DeleteInstanceProfileError>,
    },

    #[snafu(display("Failed to delete role {}: {}", name, source))]
    DeleteRole {
        name: String,
        source: RusotoError<rusoto_iam::DeleteRoleError>,
    },

    #[snafu(display("Failed to detach policy {} from role {}: {}", policy_arn, role_name, source))]
    DetachRolePolicy {
        role_name: String,
        policy_arn: String,
        source: RusotoError<rusoto_iam::DetachRolePolicyError>,
    },

    #[snafu(display("Failed to get instance profile {}: {}", name, source))]
    GetProfile {
        name: String,
        source: RusotoError<rusoto_iam::GetInstanceProfileError>,
    },

    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    IamMissingField {
        api: &'static str,
        field: &'static str,
    },

    #[snafu(display("Failed to list attached policies of role {}: {}", role_name, source))]
    ListAttachedPolicies {
        role_name: String,
        source: RusotoError<rusoto_iam::ListAttachedRolePoliciesError>,
    },

    #[snafu(display("Failed to list instance profiles for role {}: {}", role_name, source))]
    ListProfilesForRole {
        role_name: String,
        source: RusotoError<rusoto_iam::ListInstanceProfilesForRoleError>,
    },

    #[snafu(display("Failed to remove role {} from instance profile {}: {}", role_name, profile_name, source))]
    RemoveRoleFromProfile {
        profile_name: String,
        role_name: String,
        source: RusotoError<rusoto_iam::RemoveRoleFromInstanceProfileError>,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

fn map_profile(profile: rusoto_iam::InstanceProfile) -> ProfileDetails {
    ProfileDetails {
        name: profile.instance_profile_name,
        arn: profile.arn,
        role_names: profile
            .roles
            .into_iter()
            .map(|role| role.role_name)
            .collect(),
    }
}

pub(crate) struct AwsIamMediator {
    iam_client: IamClient,
}

impl AwsIamMediator {
    pub(crate) fn new(region_name: &str) -> crate::Result<Self> {
        let iam_client = super::build_client::<IamClient>(region_name)?;
        Ok(AwsIamMediator { iam_client })
    }
}

#[async_trait]
impl IamMediator for AwsIamMediator {
    async fn instance_profile_for_role(
        &self,
        role_name: &str,
    ) -> crate::Result<Option<ProfileDetails>> {
        let resp = self
            .iam_client
            .list_instance_profiles_for_role(ListInstanceProfilesForRoleRequest {
                role_name: role_name.to_string(),
                ..ListInstanceProfilesForRoleRequest::default()
            })
            .await
            .context(ListProfilesForRole { role_name })?;
        Ok(resp.instance_profiles.into_iter().next().map(map_profile))
    }

    async fn get_instance_profile(&self, name: &str) -> crate::Result<Option<ProfileDetails>> {
        let resp = self
            .iam_client
            .get_instance_profile(GetInstanceProfileRequest {
                instance_profile_name: name.to_string(),
            })
            .await;
        match resp {
            Ok(resp) => Ok(Some(map_profile(resp.instance_profile))),
            Err(RusotoError::Service(GetInstanceProfileError::NoSuchEntity(_))) => Ok(None),
            Err(source) => Err(GetProfile { name }.into_error(source).into()),
        }
    }

    async fn create_instance_profile(&self, name: &str) -> crate::Result<ProfileDetails> {
        let resp = self
            .iam_client
            .create_instance_profile(CreateInstanceProfileRequest {
                instance_profile_name: name.to_string(),
                path: Some("/".to_string()),
            })
            .await
            .context(CreateProfile { name })?;
        Ok(map_profile(resp.instance_profile))
    }

    async fn add_role_to_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> crate::Result<()> {
        self.iam_client
            .add_role_to_instance_profile(AddRoleToInstanceProfileRequest {
                instance_profile_name: profile_name.to_string(),
                role_name: role_name.to_string(),
            })
            .await
            .context(AddRoleToProfile {
                profile_name,
                role_name,
            })?;
        Ok(())
    }

    async fn remove_role_from_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> crate::Result<()> {
        self.iam_client
            .remove_role_from_instance_profile(RemoveRoleFromInstanceProfileRequest {
                instance_profile_name: profile_name.to_string(),
                role_name: role_name.to_string(),
            })
            .await
            .context(RemoveRoleFromProfile {
                profile_name,
                role_name,
            })?;
        Ok(())
    }

    async fn create_role(&self, name: &str, assume_role_policy: &str) -> crate::Result<()> {
        self.iam_client
            .create_role(CreateRoleRequest {
                role_name: name.to_string(),
                assume_role_policy_document: assume_role_policy.to_string(),
                description: Some("Role created by automation".to_string()),
                ..CreateRoleRequest::default()
            })
            .await
            .context(CreateRole { name })?;
        Ok(())
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> crate::Result<()> {
        self.iam_client
            .attach_role_policy(AttachRolePolicyRequest {
                role_name: role_name.to_string(),
                policy_arn: policy_arn.to_string(),
            })
            .await
            .context(AttachRolePolicy {
                role_name,
                policy_arn,
            })?;
        Ok(())
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> crate::Result<Vec<String>> {
        let resp = self
            .iam_client
            .list_attached_role_policies(ListAttachedRolePoliciesRequest {
                role_name: role_name.to_string(),
                ..ListAttachedRolePoliciesRequest::default()
            })
            .await
            .context(ListAttachedPolicies { role_name })?;
        let mut policy_arns = Vec::new();
        for policy in resp.attached_policies.unwrap_or_default() {
            policy_arns.push(policy.policy_arn.context(IamMissingField {
                api: "list_attached_role_policies",
                field: "policy_arn",
            })?);
        }
        Ok(policy_arns)
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> crate::Result<()> {
        self.iam_client
            .detach_role_policy(DetachRolePolicyRequest {
                role_name: role_name.to_string(),
                policy_arn: policy_arn.to_string(),
            })
            .await
            .context(DetachRolePolicy {
                role_name,
                policy_arn,
            })?;
        Ok(())
    }

    async fn delete_instance_profile(&self, name: &str) -> crate::Result<()> {
        self.iam_client
            .delete_instance_profile(DeleteInstanceProfileRequest {
                instance_profile_name: name.to_string(),
            })
            .await
            .context(DeleteProfile { name })?;
        Ok(())
    }

    async fn delete_role(&self, name: &str) -> crate::Result<()> {
        self.iam_client
            .delete_role(DeleteRoleRequest {
                role_name: name.to_string(),
            })
            .await
            .context(DeleteRole { name })?;
        Ok(())
    }
}
