mod mocks;

use mocks::{MockEc2Mediator, MockErr};
use ssm_automation_actions::resize::{resize_instance, ResizeEvent, ResizeOutcome};

#[tokio::test]
async fn instance_type_is_modified() {
    let ec2 = MockEc2Mediator::new();
    ec2.modify_instance_type
        .given(("i-123".to_string(), "m5.xlarge".to_string()))
        .will_return(Ok(()));

    let event = ResizeEvent {
        instance_id: "i-123".to_string(),
        instance_type: "m5.xlarge".to_string(),
    };
    let outcome = resize_instance(event, &ec2).await.unwrap();
    assert_eq!(
        outcome,
        ResizeOutcome {
            instance_id: "i-123".to_string(),
            instance_type: "m5.xlarge".to_string(),
        }
    );
}

#[tokio::test]
async fn modify_failure_is_reported() {
    let ec2 = MockEc2Mediator::new();
    ec2.modify_instance_type
        .given(("i-123".to_string(), "m5.xlarge".to_string()))
        .will_return(Err(MockErr {
            msg: Some("unsupported instance type".into()),
        }));

    let event = ResizeEvent {
        instance_id: "i-123".to_string(),
        instance_type: "m5.xlarge".to_string(),
    };
    let error = resize_instance(event, &ec2).await.unwrap_err();
    assert!(error.to_string().contains("i-123"));
}
