//! Custom resource that provisions an SSM-capable role and instance profile pair,
//! adopting an existing profile of the same name when one is already present.

use super::{skip_delete, CustomResourceEvent, CustomResourceResponse, RequestType};
use crate::{CfnMediator, IamMediator};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

// managed policies attached to the created role
const POLICY_ARNS: &[&str] = &["arn:aws:iam::aws:policy/service-role/AmazonEC2RoleforSSM"];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Properties {
    instance_profile_name: String,
}

pub async fn handle(
    event: CustomResourceEvent,
    iam: &impl IamMediator,
    cfn: &impl CfnMediator,
) -> CustomResourceResponse {
    match event.request_type {
        RequestType::Create => create(event, iam).await,
        // the resource does not support updates
        RequestType::Update => CustomResourceResponse::failed(event.physical_resource_id),
        RequestType::Delete => delete(event, iam, cfn).await,
    }
}

async fn create(event: CustomResourceEvent, iam: &impl IamMediator) -> CustomResourceResponse {
    let properties: Properties = match serde_json::from_value(event.resource_properties) {
        Ok(properties) => properties,
        Err(source) => {
            error!("InstanceProfileName must be defined: {}", source);
            return CustomResourceResponse::failed(None);
        }
    };
    let name = &properties.instance_profile_name;
    match create_profile(name, iam).await {
        Ok(physical_resource_id) => {
            CustomResourceResponse::success(physical_resource_id, json!({}))
        }
        Err(source) => {
            error!("Failed to create instance profile {}: {}", name, source);
            teardown(name, iam).await;
            CustomResourceResponse::failed(format!("created:{}", name))
        }
    }
}

async fn create_profile(name: &str, iam: &impl IamMediator) -> crate::Result<String> {
    if iam.get_instance_profile(name).await?.is_some() {
        return Ok(format!("existing:{}", name));
    }
    info!("Role {} does not exist. Creating", name);

    let trust_policy = json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": {
                    "Service": [
                        "ssm.amazonaws.com",
                        "ec2.amazonaws.com"
                    ]
                },
                "Action": "sts:AssumeRole"
            }
        ]
    });
    iam.create_role(name, &trust_policy.to_string()).await?;
    for policy_arn in POLICY_ARNS {
        iam.attach_role_policy(name, policy_arn).await?;
    }
    info!("Role {} created", name);

    let profile = iam.create_instance_profile(name).await?;
    iam.add_role_to_instance_profile(&profile.name, name).await?;
    info!("Instance profile {} created", name);
    Ok(format!("created:{}", name))
}

async fn delete(
    event: CustomResourceEvent,
    iam: &impl IamMediator,
    cfn: &impl CfnMediator,
) -> CustomResourceResponse {
    let physical_resource_id = event.physical_resource_id.clone().unwrap_or_default();
    if skip_delete(&physical_resource_id, event.stack_id.as_deref(), cfn).await {
        return CustomResourceResponse::success(physical_resource_id, json!({}));
    }
    let name = match physical_resource_id.splitn(2, ':').nth(1) {
        Some(name) => name.to_string(),
        None => {
            error!(
                "Physical resource id `{}` has no profile name",
                physical_resource_id
            );
            return CustomResourceResponse::failed(physical_resource_id);
        }
    };
    teardown(&name, iam).await;
    CustomResourceResponse::success(physical_resource_id, json!({}))
}

/// Deletes everything `create_profile` may have made, in dependency order,
/// carrying on past individual failures so a partial create can still be undone.
async fn teardown(name: &str, iam: &impl IamMediator) {
    match iam.list_attached_role_policies(name).await {
        Ok(policy_arns) => {
            for policy_arn in policy_arns {
                if let Err(source) = iam.detach_role_policy(name, &policy_arn).await {
                    warn!("Failed to detach policy {}: {}", policy_arn, source);
                }
            }
        }
        Err(source) => warn!("Failed to list policies of role {}: {}", name, source),
    }
    match iam.get_instance_profile(name).await {
        Ok(Some(profile)) => {
            for role_name in &profile.role_names {
                if let Err(source) = iam
                    .remove_role_from_instance_profile(&profile.name, role_name)
                    .await
                {
                    warn!("Failed to remove role {}: {}", role_name, source);
                }
            }
        }
        Ok(None) => {}
        Err(source) => warn!("Failed to get instance profile {}: {}", name, source),
    }
    if let Err(source) = iam.delete_instance_profile(name).await {
        warn!("Failed to delete instance profile {}: {}", name, source);
    }
    if let Err(source) = iam.delete_role(name).await {
        warn!("Failed to delete role {}: {}", name, source);
    }
}
