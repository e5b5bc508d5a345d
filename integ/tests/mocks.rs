use async_trait::async_trait;
use integ::{CallerIdentity, Error, Mediator, Result, StackSummaryInfo, SubnetInfo};
use mock_it::Mock;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Eq, PartialEq)]
/// Reports any error that happens due to incorrect mocks, it implements `Send`, `Sync`
/// to format it as source `<Box<dyn std::error::Error + Send + Sync>>` which we can convert
/// to the crate `Error` by wrapping it with `Error::new`
pub struct MockErr {
    pub msg: Option<String>,
}

impl Display for MockErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for MockErr {}
unsafe impl Sync for MockErr {}
unsafe impl Send for MockErr {}

pub type MockResult<T> = std::result::Result<T, MockErr>;

fn unmatched<T>() -> MockResult<T> {
    Err(MockErr {
        msg: Some("Mock does not exist for given input".into()),
    })
}

#[derive(Clone)]
pub struct MockMediator {
    pub create_stack: Mock<(String, String, Vec<(String, String)>), MockResult<()>>,
    pub stack_status: Mock<String, MockResult<String>>,
    pub stack_outputs: Mock<String, MockResult<HashMap<String, String>>>,
    pub list_stack_summaries: Mock<(), MockResult<Vec<StackSummaryInfo>>>,
    pub delete_stack: Mock<String, MockResult<()>>,
    pub create_document: Mock<(String, String, String), MockResult<()>>,
    pub document_status: Mock<String, MockResult<String>>,
    pub list_document_names: Mock<String, MockResult<Vec<String>>>,
    pub delete_document: Mock<String, MockResult<()>>,
    pub start_automation: Mock<(String, HashMap<String, Vec<String>>), MockResult<String>>,
    pub automation_status: Mock<String, MockResult<String>>,
    pub send_approval_signal: Mock<String, MockResult<()>>,
    pub instance_state_names: Mock<Vec<String>, MockResult<Vec<String>>>,
    pub caller_identity: Mock<(), MockResult<CallerIdentity>>,
    pub list_role_names: Mock<(), MockResult<Vec<String>>>,
    pub create_topic: Mock<String, MockResult<String>>,
    pub delete_topic: Mock<String, MockResult<()>>,
    pub default_vpc_ids: Mock<(), MockResult<Vec<String>>>,
    pub subnets_for_vpc: Mock<String, MockResult<Vec<SubnetInfo>>>,
}

impl MockMediator {
    pub fn new() -> MockMediator {
        MockMediator {
            create_stack: Mock::new(unmatched()),
            stack_status: Mock::new(unmatched()),
            stack_outputs: Mock::new(unmatched()),
            list_stack_summaries: Mock::new(unmatched()),
            delete_stack: Mock::new(unmatched()),
            create_document: Mock::new(unmatched()),
            document_status: Mock::new(unmatched()),
            list_document_names: Mock::new(unmatched()),
            delete_document: Mock::new(unmatched()),
            start_automation: Mock::new(unmatched()),
            automation_status: Mock::new(unmatched()),
            send_approval_signal: Mock::new(unmatched()),
            instance_state_names: Mock::new(unmatched()),
            caller_identity: Mock::new(unmatched()),
            list_role_names: Mock::new(unmatched()),
            create_topic: Mock::new(unmatched()),
            delete_topic: Mock::new(unmatched()),
            default_vpc_ids: Mock::new(unmatched()),
            subnets_for_vpc: Mock::new(unmatched()),
        }
    }
}

#[async_trait]
impl Mediator for MockMediator {
    async fn create_stack(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[(String, String)],
    ) -> Result<()> {
        self.create_stack
            .called((
                stack_name.to_string(),
                template_body.to_string(),
                parameters.to_vec(),
            ))
            .map_err(Error::new)
    }

    async fn stack_status(&self, stack_name: &str) -> Result<String> {
        self.stack_status
            .called(stack_name.to_string())
            .map_err(Error::new)
    }

    async fn stack_outputs(&self, stack_name: &str) -> Result<HashMap<String, String>> {
        self.stack_outputs
            .called(stack_name.to_string())
            .map_err(Error::new)
    }

    async fn list_stack_summaries(&self) -> Result<Vec<StackSummaryInfo>> {
        self.list_stack_summaries.called(()).map_err(Error::new)
    }

    async fn delete_stack(&self, stack_name: &str) -> Result<()> {
        self.delete_stack
            .called(stack_name.to_string())
            .map_err(Error::new)
    }

    async fn create_document(
        &self,
        name: &str,
        content: &str,
        document_type: &str,
    ) -> Result<()> {
        self.create_document
            .called((
                name.to_string(),
                content.to_string(),
                document_type.to_string(),
            ))
            .map_err(Error::new)
    }

    async fn document_status(&self, name: &str) -> Result<String> {
        self.document_status
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn list_document_names(&self, name: &str) -> Result<Vec<String>> {
        self.list_document_names
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn delete_document(&self, name: &str) -> Result<()> {
        self.delete_document
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn start_automation(
        &self,
        document_name: &str,
        parameters: &HashMap<String, Vec<String>>,
    ) -> Result<String> {
        self.start_automation
            .called((document_name.to_string(), parameters.clone()))
            .map_err(Error::new)
    }

    async fn automation_status(&self, execution_id: &str) -> Result<String> {
        self.automation_status
            .called(execution_id.to_string())
            .map_err(Error::new)
    }

    async fn send_approval_signal(&self, execution_id: &str) -> Result<()> {
        self.send_approval_signal
            .called(execution_id.to_string())
            .map_err(Error::new)
    }

    async fn instance_state_names(&self, instance_ids: &[String]) -> Result<Vec<String>> {
        self.instance_state_names
            .called(instance_ids.to_vec())
            .map_err(Error::new)
    }

    async fn caller_identity(&self) -> Result<CallerIdentity> {
        self.caller_identity.called(()).map_err(Error::new)
    }

    async fn list_role_names(&self) -> Result<Vec<String>> {
        self.list_role_names.called(()).map_err(Error::new)
    }

    async fn create_topic(&self, name: &str) -> Result<String> {
        self.create_topic
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn delete_topic(&self, topic_arn: &str) -> Result<()> {
        self.delete_topic
            .called(topic_arn.to_string())
            .map_err(Error::new)
    }

    async fn default_vpc_ids(&self) -> Result<Vec<String>> {
        self.default_vpc_ids.called(()).map_err(Error::new)
    }

    async fn subnets_for_vpc(&self, vpc_id: &str) -> Result<Vec<SubnetInfo>> {
        self.subnets_for_vpc
            .called(vpc_id.to_string())
            .map_err(Error::new)
    }
}
