mod mocks;

use mocks::MockAsgMediator;
use ssm_automation_actions::standby::{change_standby_state, StandbyEvent, StandbyState};

#[tokio::test]
async fn enter_standby_uses_the_instances_group() {
    let asg = MockAsgMediator::new();
    asg.auto_scaling_group_for
        .given("i-123".to_string())
        .will_return(Ok(Some("my-group".to_string())));
    asg.enter_standby
        .given(("i-123".to_string(), "my-group".to_string(), true))
        .will_return(Ok(()));

    let outcome = change_standby_state(
        StandbyEvent {
            state: StandbyState::EnterStandby,
            instance_id: "i-123".to_string(),
            should_decrement: true,
        },
        &asg,
    )
    .await
    .unwrap();
    assert_eq!(outcome.auto_scaling_group, Some("my-group".to_string()));
    assert_eq!(outcome.state, StandbyState::EnterStandby);
}

#[tokio::test]
async fn exit_standby_uses_the_instances_group() {
    let asg = MockAsgMediator::new();
    asg.auto_scaling_group_for
        .given("i-123".to_string())
        .will_return(Ok(Some("my-group".to_string())));
    asg.exit_standby
        .given(("i-123".to_string(), "my-group".to_string()))
        .will_return(Ok(()));

    let outcome = change_standby_state(
        StandbyEvent {
            state: StandbyState::ExitStandby,
            instance_id: "i-123".to_string(),
            should_decrement: false,
        },
        &asg,
    )
    .await
    .unwrap();
    assert_eq!(outcome.auto_scaling_group, Some("my-group".to_string()));
}

#[tokio::test]
async fn unmanaged_instance_is_left_alone() {
    let asg = MockAsgMediator::new();
    asg.auto_scaling_group_for
        .given("i-456".to_string())
        .will_return(Ok(None));

    let outcome = change_standby_state(
        StandbyEvent {
            state: StandbyState::EnterStandby,
            instance_id: "i-456".to_string(),
            should_decrement: false,
        },
        &asg,
    )
    .await
    .unwrap();
    // no standby call was mocked, so reaching here proves none was made
    assert_eq!(outcome.auto_scaling_group, None);
}
