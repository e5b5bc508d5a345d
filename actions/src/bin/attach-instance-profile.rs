//! Lambda entry point for the attach-instance-profile automation step.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::instance_profile::{
    attach_instance_profile, AttachProfileEvent, AttachProfileOutcome,
};
use ssm_automation_actions::{new_ec2, new_iam, Args, Ec2Mediator, IamMediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let ec2 = &*Box::leak(Box::new(new_ec2(&args.region)?));
    let iam = &*Box::leak(Box::new(new_iam(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: AttachProfileEvent, _context: Context| {
        handler(event, ec2, iam)
    }))
    .await
}

async fn handler(
    event: AttachProfileEvent,
    ec2: &impl Ec2Mediator,
    iam: &impl IamMediator,
) -> Result<AttachProfileOutcome, Error> {
    Ok(attach_instance_profile(event, ec2, iam).await?)
}
