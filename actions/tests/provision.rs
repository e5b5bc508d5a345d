mod mocks;

use mocks::{MockCfnMediator, MockEc2Mediator, MockIamMediator};
use serde_json::json;
use ssm_automation_actions::provision::{
    instance_profile, security_group, subnet, CustomResourceEvent, CustomResourceResponse,
    RequestType, ResponseStatus,
};
use ssm_automation_actions::ProfileDetails;

fn event(request_type: RequestType, properties: serde_json::Value) -> CustomResourceEvent {
    CustomResourceEvent {
        request_type,
        resource_properties: properties,
        physical_resource_id: None,
        stack_id: Some("arn:aws:cloudformation:us-east-1:123456789012:stack/test/abc".to_string()),
    }
}

#[tokio::test]
async fn existing_security_group_is_adopted() {
    let ec2 = MockEc2Mediator::new();
    let cfn = MockCfnMediator::new();
    ec2.find_security_group
        .given(("vpc-1".to_string(), "my-group".to_string()))
        .will_return(Ok(Some("sg-1".to_string())));

    let response = security_group::handle(
        event(
            RequestType::Create,
            json!({ "GroupName": "my-group", "VpcId": "vpc-1" }),
        ),
        &ec2,
        &cfn,
    )
    .await;
    assert_eq!(
        response,
        CustomResourceResponse::success(
            "existing:vpc-1:my-group".to_string(),
            json!({ "SecurityGroupId": "sg-1" }),
        )
    );
}

#[tokio::test]
async fn created_security_group_opens_the_platform_port() {
    let ec2 = MockEc2Mediator::new();
    let cfn = MockCfnMediator::new();
    ec2.find_security_group
        .given(("vpc-1".to_string(), "my-group".to_string()))
        .will_return(Ok(None));
    ec2.create_security_group
        .given(("vpc-1".to_string(), "my-group".to_string()))
        .will_return(Ok("sg-2".to_string()));
    ec2.authorize_ingress
        .given(("sg-2".to_string(), 3389, "10.0.0.0/16".to_string()))
        .will_return(Ok(()));

    let response = security_group::handle(
        event(
            RequestType::Create,
            json!({
                "GroupName": "my-group",
                "VpcId": "vpc-1",
                "Platform": "windows",
                "AccessCidr": "10.0.0.0/16"
            }),
        ),
        &ec2,
        &cfn,
    )
    .await;
    assert_eq!(
        response,
        CustomResourceResponse::success(
            "created:vpc-1:sg-2".to_string(),
            json!({ "SecurityGroupId": "sg-2" }),
        )
    );
}

#[tokio::test]
async fn failed_ingress_deletes_the_new_group() {
    let ec2 = MockEc2Mediator::new();
    let cfn = MockCfnMediator::new();
    ec2.find_security_group
        .given(("vpc-1".to_string(), "my-group".to_string()))
        .will_return(Ok(None));
    ec2.create_security_group
        .given(("vpc-1".to_string(), "my-group".to_string()))
        .will_return(Ok("sg-3".to_string()));
    // authorize_ingress is left unmocked so the call fails
    ec2.delete_security_group
        .given("sg-3".to_string())
        .will_return(Ok(()));

    let response = security_group::handle(
        event(
            RequestType::Create,
            json!({
                "GroupName": "my-group",
                "VpcId": "vpc-1",
                "Platform": "linux",
                "AccessCidr": "10.0.0.0/16"
            }),
        ),
        &ec2,
        &cfn,
    )
    .await;
    assert_eq!(response.status, ResponseStatus::Failed);
    assert_eq!(
        response.physical_resource_id,
        Some("created:vpc-1:sg-3".to_string())
    );
}

#[tokio::test]
async fn adopted_security_group_survives_delete() {
    let ec2 = MockEc2Mediator::new();
    let cfn = MockCfnMediator::new();

    let mut delete = event(RequestType::Delete, json!({}));
    delete.physical_resource_id = Some("existing:vpc-1:my-group".to_string());
    let response = security_group::handle(delete, &ec2, &cfn).await;
    // no delete call was mocked, so a success here proves nothing was deleted
    assert_eq!(response.status, ResponseStatus::Success);
}

#[tokio::test]
async fn created_security_group_is_deleted_with_the_stack() {
    let ec2 = MockEc2Mediator::new();
    let cfn = MockCfnMediator::new();
    cfn.stack_status
        .given("arn:aws:cloudformation:us-east-1:123456789012:stack/test/abc".to_string())
        .will_return(Ok("UPDATE_ROLLBACK_IN_PROGRESS".to_string()));
    ec2.delete_security_group
        .given("sg-2".to_string())
        .will_return(Ok(()));

    let mut delete = event(RequestType::Delete, json!({}));
    delete.physical_resource_id = Some("created:vpc-1:sg-2".to_string());
    let response = security_group::handle(delete, &ec2, &cfn).await;
    assert_eq!(response.status, ResponseStatus::Success);
}

#[tokio::test]
async fn subnet_resource_resolves_the_default_subnet() {
    let ec2 = MockEc2Mediator::new();
    ec2.default_subnet_for_vpc
        .given("vpc-1".to_string())
        .will_return(Ok(Some("subnet-1".to_string())));

    let response = subnet::handle(
        event(RequestType::Create, json!({ "VpcId": "vpc-1" })),
        &ec2,
    )
    .await;
    assert_eq!(
        response,
        CustomResourceResponse::success(None, json!({ "SubnetId": "subnet-1" }))
    );
}

#[tokio::test]
async fn subnet_resource_passes_an_explicit_subnet_through() {
    let ec2 = MockEc2Mediator::new();

    let response = subnet::handle(
        event(
            RequestType::Create,
            json!({ "VpcId": "vpc-1", "SubnetId": "subnet-9" }),
        ),
        &ec2,
    )
    .await;
    assert_eq!(
        response,
        CustomResourceResponse::success(None, json!({ "SubnetId": "subnet-9" }))
    );
}

#[tokio::test]
async fn subnet_resource_fails_without_a_default_subnet() {
    let ec2 = MockEc2Mediator::new();
    ec2.default_subnet_for_vpc
        .given("vpc-1".to_string())
        .will_return(Ok(None));

    let response = subnet::handle(
        event(RequestType::Create, json!({ "VpcId": "vpc-1", "SubnetId": "Default" })),
        &ec2,
    )
    .await;
    assert_eq!(response.status, ResponseStatus::Failed);
}

#[tokio::test]
async fn instance_profile_resource_rejects_updates() {
    let iam = MockIamMediator::new();
    let cfn = MockCfnMediator::new();

    let mut update = event(RequestType::Update, json!({}));
    update.physical_resource_id = Some("created:my-profile".to_string());
    let response = instance_profile::handle(update, &iam, &cfn).await;
    assert_eq!(response.status, ResponseStatus::Failed);
    assert_eq!(
        response.physical_resource_id,
        Some("created:my-profile".to_string())
    );
}

#[tokio::test]
async fn instance_profile_resource_adopts_an_existing_profile() {
    let iam = MockIamMediator::new();
    let cfn = MockCfnMediator::new();
    iam.get_instance_profile
        .given("my-profile".to_string())
        .will_return(Ok(Some(ProfileDetails {
            name: "my-profile".to_string(),
            arn: "arn:aws:iam::123456789012:instance-profile/my-profile".to_string(),
            role_names: vec!["my-profile".to_string()],
        })));

    let response = instance_profile::handle(
        event(
            RequestType::Create,
            json!({ "InstanceProfileName": "my-profile" }),
        ),
        &iam,
        &cfn,
    )
    .await;
    assert_eq!(
        response,
        CustomResourceResponse::success("existing:my-profile".to_string(), json!({}))
    );
}

#[tokio::test]
async fn adopted_instance_profile_survives_delete() {
    let iam = MockIamMediator::new();
    let cfn = MockCfnMediator::new();

    let mut delete = event(RequestType::Delete, json!({}));
    delete.physical_resource_id = Some("existing:my-profile".to_string());
    let response = instance_profile::handle(delete, &iam, &cfn).await;
    assert_eq!(response.status, ResponseStatus::Success);
}
