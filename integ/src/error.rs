//! Contains the error type for the integ binary.

use snafu::Snafu;
use std::path::PathBuf;

/// Alias for `Result<T, Error>`.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// The error type for the integ binary.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub(crate) enum Error {
    #[snafu(display("Automation execution {} concluded with status {}", execution_id, status))]
    AutomationFailed {
        execution_id: String,
        status: String,
    },

    #[snafu(display("Document deployment concluded with status {}", status))]
    DocumentNotActive { status: String },

    #[snafu(display("Failed to create SNS topic: {}", source))]
    CreateTopic { source: integ::Error },

    #[snafu(display("Automation document error: {}", source))]
    Document { source: integ::document::Error },

    #[snafu(display("--region should not be empty"))]
    EmptyRegion,

    #[snafu(display("Failed to render document graph: {}", source))]
    Graph { source: integ::graph::Error },

    #[snafu(display("Logger setup error: {}", source))]
    Logger { source: log::SetLoggerError },

    #[snafu(display("Failed to create the AWS mediator: {}", source))]
    Mediator { source: integ::Error },

    #[snafu(display("Stack has no output `{}`", key))]
    MissingOutput { key: String },

    #[snafu(display("Failed to read `{}`: {}", path.display(), source))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Test stack error: {}", source))]
    Stack { source: integ::stack::Error },
}
