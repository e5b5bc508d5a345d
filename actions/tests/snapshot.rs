mod mocks;

use chrono::{TimeZone, Utc};
use mocks::MockEc2Mediator;
use ssm_automation_actions::snapshot::{
    copy_snapshot, create_snapshot, delete_snapshot, CopySnapshotEvent, CreateSnapshotEvent,
    DeleteSnapshotEvent,
};
use ssm_automation_actions::SnapshotDetails;

#[tokio::test]
async fn create_reports_the_new_snapshot() {
    let start_time = Utc.ymd(2021, 3, 4).and_hms(5, 6, 7);
    let ec2 = MockEc2Mediator::new();
    ec2.create_snapshot
        .given(("vol-1".to_string(), "nightly backup".to_string()))
        .will_return(Ok(SnapshotDetails {
            snapshot_id: "snap-1".to_string(),
            start_time: Some(start_time),
        }));

    let outcome = create_snapshot(
        CreateSnapshotEvent {
            volume_id: "vol-1".to_string(),
            description: "nightly backup".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap();
    assert_eq!(outcome.snapshot_id, "snap-1");
    assert_eq!(outcome.start_time, Some(start_time));
}

#[tokio::test]
async fn delete_passes_the_snapshot_id_through() {
    let ec2 = MockEc2Mediator::new();
    ec2.delete_snapshot
        .given("snap-1".to_string())
        .will_return(Ok(()));

    delete_snapshot(
        DeleteSnapshotEvent {
            snapshot_id: "snap-1".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn copy_reports_the_copied_snapshot() {
    let ec2 = MockEc2Mediator::new();
    ec2.copy_snapshot
        .given((
            "snap-1".to_string(),
            "us-west-2".to_string(),
            "dr copy".to_string(),
        ))
        .will_return(Ok("snap-2".to_string()));

    let outcome = copy_snapshot(
        CopySnapshotEvent {
            snapshot_id: "snap-1".to_string(),
            source_region: "us-west-2".to_string(),
            description: "dr copy".to_string(),
        },
        &ec2,
    )
    .await
    .unwrap();
    assert_eq!(outcome.snapshot_id, "snap-2");
}
