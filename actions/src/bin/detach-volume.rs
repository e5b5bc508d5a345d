//! Lambda entry point for the detach-volume automation step.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::volume::{detach_volume, DetachVolumeEvent, DetachVolumeOutcome};
use ssm_automation_actions::{new_ec2, Args, Ec2Mediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let ec2 = &*Box::leak(Box::new(new_ec2(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: DetachVolumeEvent, _context: Context| {
        handler(event, ec2)
    }))
    .await
}

async fn handler(
    event: DetachVolumeEvent,
    ec2: &impl Ec2Mediator,
) -> Result<DetachVolumeOutcome, Error> {
    Ok(detach_volume(event, ec2).await?)
}
