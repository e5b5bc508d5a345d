//! Custom resource that resolves the subnet the managed instance should launch
//! into. Purely informational, nothing is created, so delete is a no-op.

use super::{CustomResourceEvent, CustomResourceResponse, RequestType};
use crate::Ec2Mediator;
use log::error;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Properties {
    vpc_id: String,
    #[serde(default)]
    subnet_id: String,
}

pub async fn handle(event: CustomResourceEvent, ec2: &impl Ec2Mediator) -> CustomResourceResponse {
    match event.request_type {
        RequestType::Create | RequestType::Update => resolve(event, ec2).await,
        RequestType::Delete => {
            CustomResourceResponse::success(event.physical_resource_id, json!({}))
        }
    }
}

async fn resolve(event: CustomResourceEvent, ec2: &impl Ec2Mediator) -> CustomResourceResponse {
    let physical_resource_id = event.physical_resource_id;
    let properties: Properties = match serde_json::from_value(event.resource_properties) {
        Ok(properties) => properties,
        Err(source) => {
            error!("VpcId must be defined: {}", source);
            return CustomResourceResponse::failed(physical_resource_id);
        }
    };

    let subnet_id = if properties.subnet_id.is_empty() || properties.subnet_id == "Default" {
        match ec2.default_subnet_for_vpc(&properties.vpc_id).await {
            Ok(Some(subnet_id)) => subnet_id,
            Ok(None) => {
                error!("Unable to find default subnet for {}", properties.vpc_id);
                return CustomResourceResponse::failed(physical_resource_id);
            }
            Err(source) => {
                error!(
                    "Failed to describe subnets of {}: {}",
                    properties.vpc_id, source
                );
                return CustomResourceResponse::failed(physical_resource_id);
            }
        }
    } else {
        properties.subnet_id
    };

    CustomResourceResponse::success(physical_resource_id, json!({ "SubnetId": subnet_id }))
}
