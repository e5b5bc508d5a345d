use crate::CfnMediator;
use async_trait::async_trait;
use rusoto_cloudformation::{
    CloudFormation, CloudFormationClient, DescribeStacksInput, UpdateStackInput,
};
use snafu::{OptionExt, ResultExt, Snafu};

/// The error type for this module.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    CfnMissingField {
        api: &'static str,
        field: &'static str,
    },

    #[snafu(display("Failed to describe stack {}: {}", stack_name, source))]
    DescribeStacks {
        stack_name: String,
        source: rusoto_core::RusotoError<rusoto_cloudformation::DescribeStacksError>,
    },

    #[snafu(display("Failed to update stack {}: {}", stack_name, source))]
    UpdateStack {
        stack_name: String,
        source: rusoto_core::RusotoError<rusoto_cloudformation::UpdateStackError>,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

pub(crate) struct AwsCfnMediator {
    cfn_client: CloudFormationClient,
}

impl AwsCfnMediator {
    pub(crate) fn new(region_name: &str) -> crate::Result<Self> {
        let cfn_client = super::build_client::<CloudFormationClient>(region_name)?;
        Ok(AwsCfnMediator { cfn_client })
    }
}

#[async_trait]
impl CfnMediator for AwsCfnMediator {
    async fn update_stack(&self, stack_name: &str, template_url: &str) -> crate::Result<()> {
        self.cfn_client
            .update_stack(UpdateStackInput {
                stack_name: stack_name.to_string(),
                template_url: Some(template_url.to_string()),
                capabilities: Some(vec!["CAPABILITY_IAM".to_string()]),
                ..UpdateStackInput::default()
            })
            .await
            .context(UpdateStack { stack_name })?;
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
            .context(CfnMissingField {
                api: "describe_stacks",
                field: "stacks[].stack_status",
            })?)
    }
}
