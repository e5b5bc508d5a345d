//! Custom resource that provisions a security group for the managed instance,
//! opening the platform's remote-access port when an access CIDR is given.

use super::{skip_delete, CustomResourceEvent, CustomResourceResponse, RequestType};
use crate::{CfnMediator, Ec2Mediator};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

const RDP_PORT: i64 = 3389;
const SSH_PORT: i64 = 22;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Properties {
    group_name: String,
    vpc_id: String,
    #[serde(default)]
    platform: String,
    #[serde(default)]
    access_cidr: String,
}

pub async fn handle(
    event: CustomResourceEvent,
    ec2: &impl Ec2Mediator,
    cfn: &impl CfnMediator,
) -> CustomResourceResponse {
    match event.request_type {
        RequestType::Create => create(event, ec2).await,
        // the resource does not support updates
        RequestType::Update => CustomResourceResponse::failed(event.physical_resource_id),
        RequestType::Delete => delete(event, ec2, cfn).await,
    }
}

async fn create(event: CustomResourceEvent, ec2: &impl Ec2Mediator) -> CustomResourceResponse {
    let properties: Properties = match serde_json::from_value(event.resource_properties) {
        Ok(properties) => properties,
        Err(source) => {
            error!("GroupName and VpcId must be defined: {}", source);
            return CustomResourceResponse::failed(None);
        }
    };
    match ec2
        .find_security_group(&properties.vpc_id, &properties.group_name)
        .await
    {
        Ok(Some(group_id)) => {
            info!(
                "Security group {} already exists in {}",
                properties.group_name, properties.vpc_id
            );
            return CustomResourceResponse::success(
                format!("existing:{}:{}", properties.vpc_id, properties.group_name),
                json!({ "SecurityGroupId": group_id }),
            );
        }
        Ok(None) => {}
        Err(source) => {
            error!(
                "Failed to find security group {}: {}",
                properties.group_name, source
            );
            return CustomResourceResponse::failed(None);
        }
    }

    let group_id = match ec2
        .create_security_group(&properties.vpc_id, &properties.group_name)
        .await
    {
        Ok(group_id) => group_id,
        Err(source) => {
            error!(
                "Failed to create security group {}: {}",
                properties.group_name, source
            );
            return CustomResourceResponse::failed(None);
        }
    };

    if !properties.access_cidr.is_empty() {
        let port = if properties.platform == "windows" {
            RDP_PORT
        } else {
            SSH_PORT
        };
        if let Err(source) = ec2
            .authorize_ingress(&group_id, port, &properties.access_cidr)
            .await
        {
            error!("Failed to authorize ingress on {}: {}", group_id, source);
            // undo the create so a retried stack does not leak groups
            if let Err(source) = ec2.delete_security_group(&group_id).await {
                warn!("Failed to delete security group {}: {}", group_id, source);
            }
            return CustomResourceResponse::failed(format!(
                "created:{}:{}",
                properties.vpc_id, group_id
            ));
        }
        info!("Ingress set on {} port {}", group_id, port);
    }

    CustomResourceResponse::success(
        format!("created:{}:{}", properties.vpc_id, group_id),
        json!({ "SecurityGroupId": group_id }),
    )
}

async fn delete(
    event: CustomResourceEvent,
    ec2: &impl Ec2Mediator,
    cfn: &impl CfnMediator,
) -> CustomResourceResponse {
    let physical_resource_id = event.physical_resource_id.clone().unwrap_or_default();
    if skip_delete(&physical_resource_id, event.stack_id.as_deref(), cfn).await {
        return CustomResourceResponse::success(physical_resource_id, json!({}));
    }
    // physical id layout is created:<vpc>:<group-id>
    let group_id = match physical_resource_id.splitn(3, ':').nth(2) {
        Some(group_id) => group_id.to_string(),
        None => {
            error!(
                "Physical resource id `{}` has no group id",
                physical_resource_id
            );
            return CustomResourceResponse::failed(physical_resource_id);
        }
    };
    if let Err(source) = ec2.delete_security_group(&group_id).await {
        warn!("Failed to delete security group {}: {}", group_id, source);
    }
    CustomResourceResponse::success(physical_resource_id, json!({}))
}
