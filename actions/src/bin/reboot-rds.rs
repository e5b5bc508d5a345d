//! Lambda entry point for the reboot-RDS-instance automation step.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::rds_control::{reboot_db_instance, RebootRdsEvent, RebootRdsOutcome};
use ssm_automation_actions::{new_rds, Args, RdsMediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let rds = &*Box::leak(Box::new(new_rds(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: RebootRdsEvent, _context: Context| {
        handler(event, rds)
    }))
    .await
}

async fn handler(event: RebootRdsEvent, rds: &impl RdsMediator) -> Result<RebootRdsOutcome, Error> {
    Ok(reboot_db_instance(event, rds).await?)
}
