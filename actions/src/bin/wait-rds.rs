//! Lambda entry point for the wait-for-RDS-instance-state automation step.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::rds_control::{wait_db_instance_state, WaitRdsEvent, WaitRdsOutcome};
use ssm_automation_actions::{new_rds, Args, RdsMediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let rds = &*Box::leak(Box::new(new_rds(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: WaitRdsEvent, _context: Context| {
        handler(event, rds)
    }))
    .await
}

async fn handler(event: WaitRdsEvent, rds: &impl RdsMediator) -> Result<WaitRdsOutcome, Error> {
    Ok(wait_db_instance_state(event, rds).await?)
}
