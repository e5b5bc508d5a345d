mod mocks;

use mocks::MockEc2Mediator;
use ssm_automation_actions::volume::{detach_volume, DetachVolumeEvent};

#[tokio::test]
async fn volume_with_no_attachments_counts_as_detached() {
    let ec2 = MockEc2Mediator::new();
    ec2.detach_volume
        .given("vol-1".to_string())
        .will_return(Ok(()));
    ec2.volume_attachment_state
        .given("vol-1".to_string())
        .will_return(Ok(None));

    let outcome = detach_volume(
        DetachVolumeEvent {
            volume_id: "vol-1".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap();
    assert_eq!(outcome.attachment_state, "detached");
}

#[tokio::test]
async fn detached_state_ends_the_poll() {
    let ec2 = MockEc2Mediator::new();
    ec2.detach_volume
        .given("vol-1".to_string())
        .will_return(Ok(()));
    ec2.volume_attachment_state
        .given("vol-1".to_string())
        .will_return(Ok(Some("detached".to_string())));

    let outcome = detach_volume(
        DetachVolumeEvent {
            volume_id: "vol-1".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap();
    assert_eq!(outcome.attachment_state, "detached");
}

// paused time lets the 35 one-second poll pauses elapse instantly
#[tokio::test(start_paused = true)]
async fn exhausted_poll_budget_reports_still_attached() {
    let ec2 = MockEc2Mediator::new();
    ec2.detach_volume
        .given("vol-3".to_string())
        .will_return(Ok(()));
    ec2.volume_attachment_state
        .given("vol-3".to_string())
        .will_return(Ok(Some("detaching".to_string())));

    let error = detach_volume(
        DetachVolumeEvent {
            volume_id: "vol-3".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap_err();
    assert!(error.to_string().contains("Current state is: detaching"));
}

#[tokio::test]
async fn busy_volume_is_a_distinct_failure() {
    let ec2 = MockEc2Mediator::new();
    ec2.detach_volume
        .given("vol-2".to_string())
        .will_return(Ok(()));
    ec2.volume_attachment_state
        .given("vol-2".to_string())
        .will_return(Ok(Some("busy".to_string())));

    let error = detach_volume(
        DetachVolumeEvent {
            volume_id: "vol-2".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap_err();
    assert!(error.to_string().contains("still mounted"));
}
