mod mocks;

use integ::stack::StackTester;
use integ::StackSummaryInfo;
use mocks::MockMediator;
use std::collections::HashMap;

const TEMPLATE: &str = "{}";

#[tokio::test]
async fn create_stack_returns_the_outputs() {
    let aws = MockMediator::new();
    aws.list_stack_summaries.given(()).will_return(Ok(vec![]));
    aws.create_stack
        .given(("test-stack".to_string(), TEMPLATE.to_string(), vec![]))
        .will_return(Ok(()));
    aws.stack_status
        .given("test-stack".to_string())
        .will_return(Ok("CREATE_COMPLETE".to_string()));
    let mut outputs = HashMap::new();
    outputs.insert("InstanceId".to_string(), "i-123".to_string());
    aws.stack_outputs
        .given("test-stack".to_string())
        .will_return(Ok(outputs.clone()));

    let stack = StackTester::new(&aws, "test-stack", TEMPLATE);
    let created = stack.create_stack(&[]).await.unwrap();
    assert_eq!(created, outputs);
}

#[tokio::test]
async fn create_stack_fails_on_rollback() {
    let aws = MockMediator::new();
    aws.list_stack_summaries.given(()).will_return(Ok(vec![]));
    aws.create_stack
        .given(("test-stack".to_string(), TEMPLATE.to_string(), vec![]))
        .will_return(Ok(()));
    aws.stack_status
        .given("test-stack".to_string())
        .will_return(Ok("ROLLBACK_COMPLETE".to_string()));

    let stack = StackTester::new(&aws, "test-stack", TEMPLATE);
    let error = stack.create_stack(&[]).await.unwrap_err();
    assert!(error.to_string().contains("ROLLBACK_COMPLETE"));
}

#[tokio::test]
async fn deleted_stack_counts_as_absent() {
    let aws = MockMediator::new();
    aws.list_stack_summaries.given(()).will_return(Ok(vec![
        StackSummaryInfo {
            stack_name: "test-stack".to_string(),
            stack_status: "DELETE_COMPLETE".to_string(),
        },
        StackSummaryInfo {
            stack_name: "other-stack".to_string(),
            stack_status: "CREATE_COMPLETE".to_string(),
        },
    ]));

    let stack = StackTester::new(&aws, "test-stack", TEMPLATE);
    assert!(!stack.is_stack_present().await.unwrap());
}

#[tokio::test]
async fn delete_stack_is_a_noop_when_absent() {
    let aws = MockMediator::new();
    aws.list_stack_summaries.given(()).will_return(Ok(vec![]));

    let stack = StackTester::new(&aws, "test-stack", TEMPLATE);
    // no delete call was mocked, so reaching here proves none was made
    stack.delete_stack().await.unwrap();
}
