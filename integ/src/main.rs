mod error;
mod integ_args;

use crate::error::Result;
use crate::integ_args::IntegArgs;
use integ::document::DocumentTester;
use integ::graph::convert_document_to_dot_graph;
use integ::stack::StackTester;
use integ::{new_mediator, Mediator};
use log::{info, warn};
use simplelog::{Config as LogConfig, SimpleLogger};
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::HashMap;
use std::fs;
use std::process;
use structopt::StructOpt;
use uuid::Uuid;

const STATUS_ACTIVE: &str = "Active";
const STATUS_SUCCESS: &str = "Success";
const STATUS_WAITING: &str = "Waiting";

const ASSUME_ROLE_PARAMETER: &str = "AutomationAssumeRole";

// Returning a Result from main makes it print a Debug representation of the error, but with Snafu
// we have nice Display representations of the error, so we wrap "main" (run) and print any error.
// https://github.com/shepmaster/snafu/issues/110
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = IntegArgs::from_args();
    // Region is required
    ensure!(!args.region.is_empty(), error::EmptyRegion);
    // Log setup
    SimpleLogger::init(args.log_level, LogConfig::default()).context(error::Logger)?;
    info!("ssm-automation integ started with {:?}", args);

    let template_body = fs::read_to_string(&args.stack_template_path).context(error::ReadFile {
        path: args.stack_template_path.clone(),
    })?;
    let doc_content = fs::read_to_string(&args.document_path).context(error::ReadFile {
        path: args.document_path.clone(),
    })?;
    info!(
        "document control flow:\n{}",
        convert_document_to_dot_graph(&doc_content).context(error::Graph)?
    );

    let aws = new_mediator(&args.region).context(error::Mediator)?;
    let run_id = Uuid::new_v4().to_simple().to_string();
    let stack_name = format!("{}integ-{}", args.resource_prefix, run_id);
    let doc_name = format!("{}integ-doc-{}", args.resource_prefix, run_id);
    let stack = StackTester::new(&aws, &stack_name, &template_body);
    let document = DocumentTester::new(&aws, &doc_name, &args.document_type, &doc_content);

    let topic_arn = match &args.sns_topic_parameter {
        Some(_) => {
            let arn = aws
                .create_topic(&stack_name)
                .await
                .context(error::CreateTopic)?;
            info!("Created SNS topic {}", arn);
            Some(arn)
        }
        None => None,
    };

    let result = test_document(&args, &stack, &document, topic_arn.as_deref()).await;
    cleanup(&aws, &stack, &document, topic_arn.as_deref()).await;
    result
}

async fn test_document(
    args: &IntegArgs,
    stack: &StackTester<'_>,
    document: &DocumentTester<'_>,
    topic_arn: Option<&str>,
) -> Result<()> {
    let outputs = stack.create_stack(&[]).await.context(error::Stack)?;

    let status = document.create_document().await.context(error::Document)?;
    ensure!(status == STATUS_ACTIVE, error::DocumentNotActive { status });

    let role_arn = document
        .get_automation_role(&args.automation_role_name)
        .await
        .context(error::Document)?;
    let mut parameters = HashMap::new();
    parameters.insert(ASSUME_ROLE_PARAMETER.to_string(), vec![role_arn]);
    if let Some(key) = &args.instance_id_output_key {
        let instance_id = outputs.get(key).context(error::MissingOutput { key })?;
        parameters.insert(args.instance_id_parameter.clone(), vec![instance_id.clone()]);
    }
    if let (Some(parameter), Some(arn)) = (&args.sns_topic_parameter, topic_arn) {
        parameters.insert(parameter.clone(), vec![arn.to_string()]);
    }

    let execution_id = document
        .execute_automation(&parameters)
        .await
        .context(error::Document)?;
    info!("Started automation execution {}", execution_id);

    let mut log_status = |status: &str| info!("Automation status: {}", status);
    let mut status = document
        .automation_execution_status(&execution_id, false, Some(&mut log_status))
        .await
        .context(error::Document)?;
    // documents with an approval step park in Waiting until someone approves
    if status == STATUS_WAITING {
        info!("Approving continuation of execution {}", execution_id);
        document
            .approve(&execution_id)
            .await
            .context(error::Document)?;
        status = document
            .automation_execution_status(&execution_id, true, Some(&mut log_status))
            .await
            .context(error::Document)?;
    }
    ensure!(
        status == STATUS_SUCCESS,
        error::AutomationFailed {
            execution_id,
            status
        }
    );
    info!("Automation concluded successfully");
    Ok(())
}

// teardown runs after a failed test too so resources do not leak between runs
async fn cleanup(
    aws: &dyn Mediator,
    stack: &StackTester<'_>,
    document: &DocumentTester<'_>,
    topic_arn: Option<&str>,
) {
    if let Err(e) = document.destroy().await {
        warn!("Failed to delete document {}: {}", document.doc_name(), e);
    }
    if let Err(e) = stack.delete_stack().await {
        warn!("Failed to delete stack {}: {}", stack.stack_name(), e);
    }
    if let Some(arn) = topic_arn {
        if let Err(e) = aws.delete_topic(arn).await {
            warn!("Failed to delete SNS topic {}: {}", arn, e);
        }
    }
}
