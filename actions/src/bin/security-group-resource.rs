//! Lambda entry point for the security-group custom resource.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::provision::{security_group, CustomResourceEvent, CustomResourceResponse};
use ssm_automation_actions::{new_cfn, new_ec2, Args, CfnMediator, Ec2Mediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let ec2 = &*Box::leak(Box::new(new_ec2(&args.region)?));
    let cfn = &*Box::leak(Box::new(new_cfn(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: CustomResourceEvent, _context: Context| {
        handler(event, ec2, cfn)
    }))
    .await
}

async fn handler(
    event: CustomResourceEvent,
    ec2: &impl Ec2Mediator,
    cfn: &impl CfnMediator,
) -> Result<CustomResourceResponse, Error> {
    Ok(security_group::handle(event, ec2, cfn).await)
}
