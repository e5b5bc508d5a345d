//! Lambda entry point for the instance-profile custom resource.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::provision::{instance_profile, CustomResourceEvent, CustomResourceResponse};
use ssm_automation_actions::{new_cfn, new_iam, Args, CfnMediator, IamMediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let iam = &*Box::leak(Box::new(new_iam(&args.region)?));
    let cfn = &*Box::leak(Box::new(new_cfn(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: CustomResourceEvent, _context: Context| {
        handler(event, iam, cfn)
    }))
    .await
}

async fn handler(
    event: CustomResourceEvent,
    iam: &impl IamMediator,
    cfn: &impl CfnMediator,
) -> Result<CustomResourceResponse, Error> {
    Ok(instance_profile::handle(event, iam, cfn).await)
}
