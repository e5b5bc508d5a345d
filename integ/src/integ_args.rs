use simplelog::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

/// SSM Automation Document Integ
///
/// Deploys the test stack and an automation document, runs the document against
/// the stack's resources and asserts that the execution succeeds, then tears
/// everything down again.
///
#[derive(StructOpt, Debug)]
pub struct IntegArgs {
    /// How much detail to log; from least to most: ERROR, WARN, INFO, DEBUG, TRACE
    #[structopt(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
    /// The Region to run the test in
    #[structopt(long, env = "AWS_REGION")]
    pub region: String,
    /// Path of the automation document to test
    #[structopt(long, env = "DOCUMENT_PATH")]
    pub document_path: PathBuf,
    /// SSM document type of the document under test
    #[structopt(long, env = "DOCUMENT_TYPE", default_value = "Automation")]
    pub document_type: String,
    /// Path of the CloudFormation template with the test resources
    #[structopt(long, env = "STACK_TEMPLATE_PATH")]
    pub stack_template_path: PathBuf,
    /// Prefix for the names of all resources the test creates
    #[structopt(long, env = "RESOURCE_PREFIX", default_value = "ssm-testing-")]
    pub resource_prefix: String,
    /// Name of the service role the automation assumes
    #[structopt(long, env = "AUTOMATION_ROLE_NAME")]
    pub automation_role_name: String,
    /// Stack output key holding the id of the test instance, when the document
    /// takes an instance id
    #[structopt(long, env = "INSTANCE_ID_OUTPUT_KEY")]
    pub instance_id_output_key: Option<String>,
    /// Document parameter the test instance id is passed as
    #[structopt(long, env = "INSTANCE_ID_PARAMETER", default_value = "InstanceId")]
    pub instance_id_parameter: String,
    /// Document parameter to receive the ARN of an SNS topic created for
    /// approval notifications, when the document takes one
    #[structopt(long, env = "SNS_TOPIC_PARAMETER")]
    pub sns_topic_parameter: Option<String>,
}
