//! Lambda entry point for the update-CloudFormation-stack automation step.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::stack_update::{update_stack, UpdateStackEvent, UpdateStackOutcome};
use ssm_automation_actions::{new_cfn, Args, CfnMediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let cfn = &*Box::leak(Box::new(new_cfn(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: UpdateStackEvent, _context: Context| {
        handler(event, cfn)
    }))
    .await
}

async fn handler(
    event: UpdateStackEvent,
    cfn: &impl CfnMediator,
) -> Result<UpdateStackOutcome, Error> {
    Ok(update_stack(event, cfn).await?)
}
