/*!
CloudFormation custom-resource handlers used by the managed-instance setup
documents. These follow the custom-resource contract rather than the plain
automation-step contract: every request, including a failed one, must produce a
response object so the owning stack can make progress. Handlers here therefore
never return an error; failures become a `Failed` response carrying the
physical resource id CloudFormation should remember.

Physical ids encode provenance so that stack deletion can tell resources we
created apart from pre-existing ones it must leave alone: `existing:<...>` for
adopted resources and `created:<...>` for resources this stack owns.
*/

pub mod instance_profile;
pub mod security_group;
pub mod subnet;

use crate::CfnMediator;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const EXISTING_PREFIX: &str = "existing:";
const STACK_DELETE_IN_PROGRESS: &str = "DELETE_IN_PROGRESS";

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// The request envelope CloudFormation sends to a custom resource.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub resource_properties: Value,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub stack_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum ResponseStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

/// The response the entry point hands back to the invoking service.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    pub data: Value,
}

impl CustomResourceResponse {
    pub fn success<P: Into<Option<String>>>(physical_resource_id: P, data: Value) -> Self {
        Self {
            status: ResponseStatus::Success,
            physical_resource_id: physical_resource_id.into(),
            data,
        }
    }

    pub fn failed<P: Into<Option<String>>>(physical_resource_id: P) -> Self {
        Self {
            status: ResponseStatus::Failed,
            physical_resource_id: physical_resource_id.into(),
            data: Value::Object(Default::default()),
        }
    }
}

fn is_adopted(physical_resource_id: &str) -> bool {
    physical_resource_id.starts_with(EXISTING_PREFIX)
}

/// True when deleting this resource should skip cleanup: adopted resources are
/// never ours to delete, and a stack in `DELETE_IN_PROGRESS` skips cleanup too,
/// so teardown only runs while CloudFormation rolls back a failed create.
async fn skip_delete(
    physical_resource_id: &str,
    stack_id: Option<&str>,
    cfn: &impl CfnMediator,
) -> bool {
    if is_adopted(physical_resource_id) {
        return true;
    }
    let stack_id = match stack_id {
        Some(stack_id) => stack_id,
        None => return false,
    };
    match cfn.stack_status(stack_id).await {
        Ok(status) => status == STACK_DELETE_IN_PROGRESS,
        Err(source) => {
            warn!(
                "Failed to describe stack {} during delete: {}",
                stack_id, source
            );
            false
        }
    }
}
