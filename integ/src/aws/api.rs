use crate::{CallerIdentity, Mediator, StackSummaryInfo, SubnetInfo};
use async_trait::async_trait;
use rusoto_cloudformation::{
    CloudFormation, CloudFormationClient, CreateStackInput, DeleteStackInput, DescribeStacksInput,
    ListStacksInput, Parameter,
};
use rusoto_ec2::{DescribeInstanceStatusRequest, DescribeSubnetsRequest, DescribeVpcsRequest, Ec2, Ec2Client, Filter};
use rusoto_iam::{Iam, IamClient, ListRolesRequest};
use rusoto_sns::{CreateTopicInput, DeleteTopicInput, Sns, SnsClient};
use rusoto_ssm::{
    CreateDocumentRequest, DeleteDocumentRequest, DescribeDocumentRequest, DocumentFilter,
    GetAutomationExecutionRequest, ListDocumentsRequest, SendAutomationSignalRequest, Ssm,
    SsmClient, StartAutomationExecutionRequest,
};
use rusoto_sts::{GetCallerIdentityRequest, Sts, StsClient};
use snafu::{OptionExt, ResultExt, Snafu};
use std::collections::HashMap;

/// The error type for this module.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    MissingField {
        api: &'static str,
        field: &'static str,
    },

    #[snafu(display("Failed to create stack {}: {}", stack_name, source))]
    CreateStack {
        stack_name: String,
        source: rusoto_core::RusotoError<rusoto_cloudformation::CreateStackError>,
    },

    #[snafu(display("Failed to create topic {}: {}", name, source))]
    CreateTopic {
        name: String,
        source: rusoto_core::RusotoError<rusoto_sns::CreateTopicError>,
    },

    #[snafu(display("Failed to create document {}: {}", name, source))]
    CreateDocument {
        name: String,
        source: rusoto_core::RusotoError<rusoto_ssm::CreateDocumentError>,
    },

    #[snafu(display("Failed to delete document {}: {}", name, source))]
    DeleteDocument {
        name: String,
        source: rusoto_core::RusotoError<rusoto_ssm::DeleteDocumentError>,
    },

    #[snafu(display("Failed to delete stack {}: {}", stack_name, source))]
    DeleteStack {
        stack_name: String,
        source: rusoto_core::RusotoError<rusoto_cloudformation::DeleteStackError>,
    },

    #[snafu(display("Failed to delete topic {}: {}", topic_arn, source))]
    DeleteTopic {
        topic_arn: String,
        source: rusoto_core::RusotoError<rusoto_sns::DeleteTopicError>,
    },

    #[snafu(display("Failed to describe document {}: {}", name, source))]
    DescribeDocument {
        name: String,
        source: rusoto_core::RusotoError<rusoto_ssm::DescribeDocumentError>,
    },

    #[snafu(display("Failed to describe instance status: {}", source))]
    DescribeInstanceStatus {
        source: rusoto_core::RusotoError<rusoto_ec2::DescribeInstanceStatusError>,
    },

    #[snafu(display("Failed to describe stack {}: {}", stack_name, source))]
    DescribeStacks {
        stack_name: String,
        source: rusoto_core::RusotoError<rusoto_cloudformation::DescribeStacksError>,
    },

    #[snafu(display("Failed to describe subnets of {}: {}", vpc_id, source))]
    DescribeSubnets {
        vpc_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::DescribeSubnetsError>,
    },

    #[snafu(display("Failed to describe VPCs: {}", source))]
    DescribeVpcs {
        source: rusoto_core::RusotoError<rusoto_ec2::DescribeVpcsError>,
    },

    #[snafu(display("Failed to get automation execution {}: {}", execution_id, source))]
    GetAutomation {
        execution_id: String,
        source: rusoto_core::RusotoError<rusoto_ssm::GetAutomationExecutionError>,
    },

    #[snafu(display("Failed to get caller identity: {}", source))]
    GetCallerIdentity {
        source: rusoto_core::RusotoError<rusoto_sts::GetCallerIdentityError>,
    },

    #[snafu(display("Failed to list documents: {}", source))]
    ListDocuments {
        source: rusoto_core::RusotoError<rusoto_ssm::ListDocumentsError>,
    },

    #[snafu(display("Failed to list roles: {}", source))]
    ListRoles {
        source: rusoto_core::RusotoError<rusoto_iam::ListRolesError>,
    },

    #[snafu(display("Failed to list stacks: {}", source))]
    ListStacks {
        source: rusoto_core::RusotoError<rusoto_cloudformation::ListStacksError>,
    },

    #[snafu(display("Failed to send approval signal to {}: {}", execution_id, source))]
    SendSignal {
        execution_id: String,
        source: rusoto_core::RusotoError<rusoto_ssm::SendAutomationSignalError>,
    },

    #[snafu(display("Failed to start automation for document {}: {}", document_name, source))]
    StartAutomation {
        document_name: String,
        source: rusoto_core::RusotoError<rusoto_ssm::StartAutomationExecutionError>,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

pub(crate) struct AwsMediator {
    cfn_client: CloudFormationClient,
    ec2_client: Ec2Client,
    iam_client: IamClient,
    sns_client: SnsClient,
    ssm_client: SsmClient,
    sts_client: StsClient,
}

impl AwsMediator {
    pub(crate) fn new(region_name: &str) -> crate::Result<Self> {
        Ok(AwsMediator {
            cfn_client: super::build_client::<CloudFormationClient>(region_name)?,
            ec2_client: super::build_client::<Ec2Client>(region_name)?,
            iam_client: super::build_client::<IamClient>(region_name)?,
            sns_client: super::build_client::<SnsClient>(region_name)?,
            ssm_client: super::build_client::<SsmClient>(region_name)?,
            sts_client: super::build_client::<StsClient>(region_name)?,
        })
    }
}

#[async_trait]
impl Mediator for AwsMediator {
    async fn create_stack(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
    ) -> crate::Result<()> {
        let parameters = parameters
            .iter()
            .map(|(key, value)| Parameter {
                parameter_key: Some(key.clone()),
                parameter_value: Some(value.clone()),
                ..Parameter::default()
            })
            .collect();
        self.cfn_client
            .create_stack(CreateStackInput {
                stack_name: stack_name.to_string(),
                template_body: Some(template_body.to_string()),
                parameters: Some(parameters),
                capabilities: Some(vec!["CAPABILITY_IAM".to_string()]),
                ..CreateStackInput::default()
            })
            .await
            .context(CreateStack { stack_name })?;
        Ok(())
    }

    async fn stack_status(&self, stack_name: &str) -> crate::Result<String> {
        let resp = self
            .cfn_client
            .describe_stacks(DescribeStacksInput {
                stack_name: Some(stack_name.to_string()),
                ..DescribeStacksInput::default()
            })
            .await
            .context(DescribeStacks { stack_name })?;
        Ok(resp
            .stacks
            .and_then(|mut stacks| {
                if stacks.is_empty() {
                    None
                } else {
                    Some(stacks.remove(0).stack_status)
                }
            })
            .context(MissingField {
                api: "describe_stacks",
                field: "stacks[].stack_status",
            })?)
    }

    async fn stack_outputs(&self, stack_name: &str) -> crate::Result<HashMap<String, String>> {
        let resp = self
            .cfn_client
            .describe_stacks(DescribeStacksInput {
                stack_name: Some(stack_name.to_string()),
                ..DescribeStacksInput::default()
            })
            .await
            .context(DescribeStacks { stack_name })?;
        let stack = resp
            .stacks
            .and_then(|mut stacks| {
                if stacks.is_empty() {
                    None
                } else {
                    Some(stacks.remove(0))
                }
            })
            .context(MissingField {
                api: "describe_stacks",
                field: "stacks",
            })?;
        let mut outputs = HashMap::new();
        for output in stack.outputs.unwrap_or_default() {
            outputs.insert(
                output.output_key.context(MissingField {
                    api: "describe_stacks",
                    field: "stacks[].outputs[].output_key",
                })?,
                output.output_value.context(MissingField {
                    api: "describe_stacks",
                    field: "stacks[].outputs[].output_value",
                })?,
            );
        }
        Ok(outputs)
    }

    async fn list_stack_summaries(&self) -> crate::Result<Vec<StackSummaryInfo>> {
        let mut summaries = Vec::new();
        let mut next_token = None;
        loop {
            let resp = self
                .cfn_client
                .list_stacks(ListStacksInput {
                    next_token,
                    ..ListStacksInput::default()
                })
                .await
                .context(ListStacks)?;
            for summary in resp.stack_summaries.unwrap_or_default() {
                summaries.push(StackSummaryInfo {
                    stack_name: summary.stack_name,
                    stack_status: summary.stack_status,
                });
            }
            next_token = resp.next_token;
            if next_token.is_none() {
                break;
            }
        }
        Ok(summaries)
    }

    async fn delete_stack(&self, stack_name: &str) -> crate::Result<()> {
        self.cfn_client
            .delete_stack(DeleteStackInput {
                stack_name: stack_name.to_string(),
                ..DeleteStackInput::default()
            })
            .await
            .context(DeleteStack { stack_name })?;
        Ok(())
    }

    async fn create_document(
        &self,
        name: &str,
        content: &str,
        document_type: &str,
    ) -> crate::Result<()> {
        self.ssm_client
            .create_document(CreateDocumentRequest {
                name: name.to_string(),
                content: content.to_string(),
                document_type: Some(document_type.to_string()),
                ..CreateDocumentRequest::default()
            })
            .await
            .context(CreateDocument { name })?;
        Ok(())
    }

    async fn document_status(&self, name: &str) -> crate::Result<String> {
        let resp = self
            .ssm_client
            .describe_document(DescribeDocumentRequest {
                name: name.to_string(),
                ..DescribeDocumentRequest::default()
            })
            .await
            .context(DescribeDocument { name })?;
        Ok(resp
            .document
            .and_then(|document| document.status)
            .context(MissingField {
                api: "describe_document",
                field: "document.status",
            })?)
    }

    async fn list_document_names(&self, name: &str) -> crate::Result<Vec<String>> {
        let resp = self
            .ssm_client
            .list_documents(ListDocumentsRequest {
                document_filter_list: Some(vec![DocumentFilter {
                    key: "Name".to_string(),
                    value: name.to_string(),
                }]),
                ..ListDocumentsRequest::default()
            })
            .await
            .context(ListDocuments)?;
        Ok(resp
            .document_identifiers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|identifier| identifier.name)
            .collect())
    }

    async fn delete_document(&self, name: &str) -> crate::Result<()> {
        self.ssm_client
            .delete_document(DeleteDocumentRequest {
                name: name.to_string(),
                ..DeleteDocumentRequest::default()
            })
            .await
            .context(DeleteDocument { name })?;
        Ok(())
    }

    async fn start_automation(
        &self,
        document_name: &str,
        parameters: &HashMap<String, Vec<String>>,
    ) -> crate::Result<String> {
        let resp = self
            .ssm_client
            .start_automation_execution(StartAutomationExecutionRequest {
                document_name: document_name.to_string(),
                parameters: Some(parameters.clone()),
                ..StartAutomationExecutionRequest::default()
            })
            .await
            .context(StartAutomation { document_name })?;
        Ok(resp.automation_execution_id.context(MissingField {
            api: "start_automation_execution",
            field: "automation_execution_id",
        })?)
    }

    async fn automation_status(&self, execution_id: &str) -> crate::Result<String> {
        let resp = self
            .ssm_client
            .get_automation_execution(GetAutomationExecutionRequest {
                automation_execution_id: execution_id.to_string(),
            })
            .await
            .context(GetAutomation { execution_id })?;
        Ok(resp
            .automation_execution
            .and_then(|execution| execution.automation_execution_status)
            .context(MissingField {
                api: "get_automation_execution",
                field: "automation_execution.automation_execution_status",
            })?)
    }

    async fn send_approval_signal(&self, execution_id: &str) -> crate::Result<()> {
        self.ssm_client
            .send_automation_signal(SendAutomationSignalRequest {
                automation_execution_id: execution_id.to_string(),
                signal_type: "Approve".to_string(),
                ..SendAutomationSignalRequest::default()
            })
            .await
            .context(SendSignal { execution_id })?;
        Ok(())
    }

    async fn instance_state_names(&self, instance_ids: &[String]) -> crate::Result<Vec<String>> {
        let resp = self
            .ec2_client
            .describe_instance_status(DescribeInstanceStatusRequest {
                instance_ids: Some(instance_ids.to_vec()),
                include_all_instances: Some(true),
                ..DescribeInstanceStatusRequest::default()
            })
            .await
            .context(DescribeInstanceStatus)?;
        let mut states = Vec::new();
        for status in resp.instance_statuses.unwrap_or_default() {
            states.push(
                status
                    .instance_state
                    .and_then(|state| state.name)
                    .context(MissingField {
                        api: "describe_instance_status",
                        field: "instance_statuses[].instance_state.name",
                    })?,
            );
        }
        Ok(states)
    }

    async fn caller_identity(&self) -> crate::Result<CallerIdentity> {
        let resp = self
            .sts_client
            .get_caller_identity(GetCallerIdentityRequest {})
            .await
            .context(GetCallerIdentity)?;
        Ok(CallerIdentity {
            account: resp.account.context(MissingField {
                api: "get_caller_identity",
                field: "account",
            })?,
            arn: resp.arn.context(MissingField {
                api: "get_caller_identity",
                field: "arn",
            })?,
        })
    }

    async fn list_role_names(&self) -> crate::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut marker = None;
        loop {
            let resp = self
                .iam_client
                .list_roles(ListRolesRequest {
                    marker,
                    ..ListRolesRequest::default()
                })
                .await
                .context(ListRoles)?;
            names.extend(resp.roles.into_iter().map(|role| role.role_name));
            if !resp.is_truncated.unwrap_or(false) {
                break;
            }
            marker = resp.marker;
        }
        Ok(names)
    }

    async fn create_topic(&self, name: &str) -> crate::Result<String> {
        let resp = self
            .sns_client
            .create_topic(CreateTopicInput {
                name: name.to_string(),
                ..CreateTopicInput::default()
            })
            .await
            .context(CreateTopic { name })?;
        Ok(resp.topic_arn.context(MissingField {
            api: "create_topic",
            field: "topic_arn",
        })?)
    }

    async fn delete_topic(&self, topic_arn: &str) -> crate::Result<()> {
        self.sns_client
            .delete_topic(DeleteTopicInput {
                topic_arn: topic_arn.to_string(),
            })
            .await
            .context(DeleteTopic { topic_arn })?;
        Ok(())
    }

    async fn default_vpc_ids(&self) -> crate::Result<Vec<String>> {
        let resp = self
            .ec2_client
            .describe_vpcs(DescribeVpcsRequest {
                filters: Some(vec![Filter {
                    name: Some("isDefault".to_string()),
                    values: Some(vec!["true".to_string()]),
                }]),
                ..DescribeVpcsRequest::default()
            })
            .await
            .context(DescribeVpcs)?;
        Ok(resp
            .vpcs
            .unwrap_or_default()
            .into_iter()
            .filter_map(|vpc| vpc.vpc_id)
            .collect())
    }

    async fn subnets_for_vpc(&self, vpc_id: &str) -> crate::Result<Vec<SubnetInfo>> {
        let resp = self
            .ec2_client
            .describe_subnets(DescribeSubnetsRequest {
                filters: Some(vec![Filter {
                    name: Some("vpc-id".to_string()),
                    values: Some(vec![vpc_id.to_string()]),
                }]),
                ..DescribeSubnetsRequest::default()
            })
            .await
            .context(DescribeSubnets { vpc_id })?;
        let mut subnets = Vec::new();
        for subnet in resp.subnets.unwrap_or_default() {
            subnets.push(SubnetInfo {
                subnet_id: subnet.subnet_id.context(MissingField {
                    api: "describe_subnets",
                    field: "subnets[].subnet_id",
                })?,
                state: subnet.state.context(MissingField {
                    api: "describe_subnets",
                    field: "subnets[].state",
                })?,
            });
        }
        Ok(subnets)
    }
}
