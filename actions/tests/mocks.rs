use async_trait::async_trait;
use mock_it::Mock;
use ssm_automation_actions::{
    AsgMediator, CfnMediator, Ec2Mediator, Error, IamMediator, ProfileDetails, RdsMediator,
    Result, SnapshotDetails,
};
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
pub struct MockEc2Mediator {
    pub create_snapshot: Mock<(String, String), MockResult<SnapshotDetails>>,
    pub delete_snapshot: Mock<String, MockResult<()>>,
    pub copy_snapshot: Mock<(String, String, String), MockResult<String>>,
    pub modify_instance_type: Mock<(String, String), MockResult<()>>,
    pub detach_volume: Mock<String, MockResult<()>>,
    pub volume_attachment_state: Mock<String, MockResult<Option<String>>>,
    pub instance_profile_association: Mock<String, MockResult<Option<String>>>,
    pub disassociate_instance_profile: Mock<String, MockResult<()>>,
    pub associate_instance_profile: Mock<(String, String, String), MockResult<String>>,
    pub find_security_group: Mock<(String, String), MockResult<Option<String>>>,
    pub create_security_group: Mock<(String, String), MockResult<String>>,
    pub authorize_ingress: Mock<(String, i64, String), MockResult<()>>,
    pub delete_security_group: Mock<String, MockResult<()>>,
    pub default_subnet_for_vpc: Mock<String, MockResult<Option<String>>>,
}

impl MockEc2Mediator {
    pub fn new() -> MockEc2Mediator {
        MockEc2Mediator {
            create_snapshot: Mock::new(unmatched()),
            delete_snapshot: Mock::new(unmatched()),
            copy_snapshot: Mock::new(unmatched()),
            modify_instance_type: Mock::new(unmatched()),
            detach_volume: Mock::new(unmatched()),
            volume_attachment_state: Mock::new(unmatched()),
            instance_profile_association: Mock::new(unmatched()),
            disassociate_instance_profile: Mock::new(unmatched()),
            associate_instance_profile: Mock::new(unmatched()),
            find_security_group: Mock::new(unmatched()),
            create_security_group: Mock::new(unmatched()),
            authorize_ingress: Mock::new(unmatched()),
            delete_security_group: Mock::new(unmatched()),
            default_subnet_for_vpc: Mock::new(unmatched()),
        }
    }
}

#[async_trait]
impl Ec2Mediator for MockEc2Mediator {
    async fn create_snapshot(
        &self,
        volume_id: &str,
        description: &str,
    ) -> Result<SnapshotDetails> {
        self.create_snapshot
            .called((volume_id.to_string(), description.to_string()))
            .map_err(Error::new)
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        self.delete_snapshot
            .called(snapshot_id.to_string())
            .map_err(Error::new)
    }

    async fn copy_snapshot(
        &self,
        snapshot_id: &str,
        source_region: &str,
        description: &str,
    ) -> Result<String> {
        self.copy_snapshot
            .called((
                snapshot_id.to_string(),
                source_region.to_string(),
                description.to_string(),
            ))
            .map_err(Error::new)
    }

    async fn modify_instance_type(&self, instance_id: &str, instance_type: &str) -> Result<()> {
        self.modify_instance_type
            .called((instance_id.to_string(), instance_type.to_string()))
            .map_err(Error::new)
    }

    async fn detach_volume(&self, volume_id: &str) -> Result<()> {
        self.detach_volume
            .called(volume_id.to_string())
            .map_err(Error::new)
    }

    async fn volume_attachment_state(&self, volume_id: &str) -> Result<Option<String>> {
        self.volume_attachment_state
            .called(volume_id.to_string())
            .map_err(Error::new)
    }

    async fn instance_profile_association(&self, instance_id: &str) -> Result<Option<String>> {
        self.instance_profile_association
            .called(instance_id.to_string())
            .map_err(Error::new)
    }

    async fn disassociate_instance_profile(&self, association_id: &str) -> Result<()> {
        self.disassociate_instance_profile
            .called(association_id.to_string())
            .map_err(Error::new)
    }

    async fn associate_instance_profile(
        &self,
        profile_name: &str,
        profile_arn: &str,
        instance_id: &str,
    ) -> Result<String> {
        self.associate_instance_profile
            .called((
                profile_name.to_string(),
                profile_arn.to_string(),
                instance_id.to_string(),
            ))
            .map_err(Error::new)
    }

    async fn find_security_group(
        &self,
        vpc_id: &str,
        group_name: &str,
    ) -> Result<Option<String>> {
        self.find_security_group
            .called((vpc_id.to_string(), group_name.to_string()))
            .map_err(Error::new)
    }

    async fn create_security_group(&self, vpc_id: &str, group_name: &str) -> Result<String> {
        self.create_security_group
            .called((vpc_id.to_string(), group_name.to_string()))
            .map_err(Error::new)
    }

    async fn authorize_ingress(&self, group_id: &str, port: i64, cidr: &str) -> Result<()> {
        self.authorize_ingress
            .called((group_id.to_string(), port, cidr.to_string()))
            .map_err(Error::new)
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        self.delete_security_group
            .called(group_id.to_string())
            .map_err(Error::new)
    }

    async fn default_subnet_for_vpc(&self, vpc_id: &str) -> Result<Option<String>> {
        self.default_subnet_for_vpc
            .called(vpc_id.to_string())
            .map_err(Error::new)
    }
}

#[derive(Clone)]
pub struct MockAsgMediator {
    pub auto_scaling_group_for: Mock<String, MockResult<Option<String>>>,
    pub enter_standby: Mock<(String, String, bool), MockResult<()>>,
    pub exit_standby: Mock<(String, String), MockResult<()>>,
}

impl MockAsgMediator {
    pub fn new() -> MockAsgMediator {
        MockAsgMediator {
            auto_scaling_group_for: Mock::new(unmatched()),
            enter_standby: Mock::new(unmatched()),
            exit_standby: Mock::new(unmatched()),
        }
    }
}

#[async_trait]
impl AsgMediator for MockAsgMediator {
    async fn auto_scaling_group_for(&self, instance_id: &str) -> Result<Option<String>> {
        self.auto_scaling_group_for
            .called(instance_id.to_string())
            .map_err(Error::new)
    }

    async fn enter_standby(
        &self,
        instance_id: &str,
        group_name: &str,
        decrement: bool,
    ) -> Result<()> {
        self.enter_standby
            .called((instance_id.to_string(), group_name.to_string(), decrement))
            .map_err(Error::new)
    }

    async fn exit_standby(&self, instance_id: &str, group_name: &str) -> Result<()> {
        self.exit_standby
            .called((instance_id.to_string(), group_name.to_string()))
            .map_err(Error::new)
    }
}

#[derive(Clone)]
pub struct MockIamMediator {
    pub instance_profile_for_role: Mock<String, MockResult<Option<ProfileDetails>>>,
    pub get_instance_profile: Mock<String, MockResult<Option<ProfileDetails>>>,
    pub create_instance_profile: Mock<String, MockResult<ProfileDetails>>,
    pub add_role_to_instance_profile: Mock<(String, String), MockResult<()>>,
    pub remove_role_from_instance_profile: Mock<(String, String), MockResult<()>>,
    pub create_role: Mock<(String, String), MockResult<()>>,
    pub attach_role_policy: Mock<(String, String), MockResult<()>>,
    pub list_attached_role_policies: Mock<String, MockResult<Vec<String>>>,
    pub detach_role_policy: Mock<(String, String), MockResult<()>>,
    pub delete_instance_profile: Mock<String, MockResult<()>>,
    pub delete_role: Mock<String, MockResult<()>>,
}

impl MockIamMediator {
    pub fn new() -> MockIamMediator {
        MockIamMediator {
            instance_profile_for_role: Mock::new(unmatched()),
            get_instance_profile: Mock::new(unmatched()),
            create_instance_profile: Mock::new(unmatched()),
            add_role_to_instance_profile: Mock::new(unmatched()),
            remove_role_from_instance_profile: Mock::new(unmatched()),
            create_role: Mock::new(unmatched()),
            attach_role_policy: Mock::new(unmatched()),
            list_attached_role_policies: Mock::new(unmatched()),
            detach_role_policy: Mock::new(unmatched()),
            delete_instance_profile: Mock::new(unmatched()),
            delete_role: Mock::new(unmatched()),
        }
    }
}

#[async_trait]
impl IamMediator for MockIamMediator {
    async fn instance_profile_for_role(&self, role_name: &str) -> Result<Option<ProfileDetails>> {
        self.instance_profile_for_role
            .called(role_name.to_string())
            .map_err(Error::new)
    }

    async fn get_instance_profile(&self, name: &str) -> Result<Option<ProfileDetails>> {
        self.get_instance_profile
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn create_instance_profile(&self, name: &str) -> Result<ProfileDetails> {
        self.create_instance_profile
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn add_role_to_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> Result<()> {
        self.add_role_to_instance_profile
            .called((profile_name.to_string(), role_name.to_string()))
            .map_err(Error::new)
    }

    async fn remove_role_from_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> Result<()> {
        self.remove_role_from_instance_profile
            .called((profile_name.to_string(), role_name.to_string()))
            .map_err(Error::new)
    }

    async fn create_role(&self, name: &str, assume_role_policy: &str) -> Result<()> {
        self.create_role
            .called((name.to_string(), assume_role_policy.to_string()))
            .map_err(Error::new)
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.attach_role_policy
            .called((role_name.to_string(), policy_arn.to_string()))
            .map_err(Error::new)
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> Result<Vec<String>> {
        self.list_attached_role_policies
            .called(role_name.to_string())
            .map_err(Error::new)
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.detach_role_policy
            .called((role_name.to_string(), policy_arn.to_string()))
            .map_err(Error::new)
    }

    async fn delete_instance_profile(&self, name: &str) -> Result<()> {
        self.delete_instance_profile
            .called(name.to_string())
            .map_err(Error::new)
    }

    async fn delete_role(&self, name: &str) -> Result<()> {
        self.delete_role
            .called(name.to_string())
            .map_err(Error::new)
    }
}

#[derive(Clone)]
pub struct MockRdsMediator {
    pub db_instance_status: Mock<String, MockResult<String>>,
    pub reboot_db_instance: Mock<String, MockResult<()>>,
}

impl MockRdsMediator {
    pub fn new() -> MockRdsMediator {
        MockRdsMediator {
            db_instance_status: Mock::new(unmatched()),
            reboot_db_instance: Mock::new(unmatched()),
        }
    }
}

#[async_trait]
impl RdsMediator for MockRdsMediator {
    async fn db_instance_status(&self, instance_id: &str) -> Result<String> {
        self.db_instance_status
            .called(instance_id.to_string())
            .map_err(Error::new)
    }

    async fn reboot_db_instance(&self, instance_id: &str) -> Result<()> {
        self.reboot_db_instance
            .called(instance_id.to_string())
            .map_err(Error::new)
    }
}

#[derive(Clone)]
pub struct MockCfnMediator {
    pub update_stack: Mock<(String, String), MockResult<()>>,
    pub stack_status: Mock<String, MockResult<String>>,
}

impl MockCfnMediator {
    pub fn new() -> MockCfnMediator {
        MockCfnMediator {
            update_stack: Mock::new(unmatched()),
            stack_status: Mock::new(unmatched()),
        }
    }
}

#[async_trait]
impl CfnMediator for MockCfnMediator {
    async fn update_stack(&self, stack_name: &str, template_url: &str) -> Result<()> {
        self.update_stack
            .called((stack_name.to_string(), template_url.to_string()))
            .map_err(Error::new)
    }

    async fn stack_status(&self, stack_name: &str) -> Result<String> {
        self.stack_status
            .called(stack_name.to_string())
            .map_err(Error::new)
    }
}
