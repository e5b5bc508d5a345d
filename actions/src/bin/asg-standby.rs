//! Lambda entry point for the ASG standby automation step.

use lambda_runtime::{handler_fn, Context};
use ssm_automation_actions::standby::{change_standby_state, StandbyEvent, StandbyOutcome};
use ssm_automation_actions::{new_asg, Args, AsgMediator};
use structopt::StructOpt;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();
    let asg = &*Box::leak(Box::new(new_asg(&args.region)?));
    lambda_runtime::run(handler_fn(move |event: StandbyEvent, _context: Context| {
        handler(event, asg)
    }))
    .await
}

async fn handler(event: StandbyEvent, asg: &impl AsgMediator) -> Result<StandbyOutcome, Error> {
    Ok(change_standby_state(event, asg).await?)
}
