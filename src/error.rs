use thiserror::Error;

use crate::model::WorkflowStatus;

#[derive(Error, Debug)]
pub enum CircleCiError {
    #[error("Missing field `{0}` in CircleCI response")]
    MissingField(String),

    #[error("Failed to parse timestamp '{value}' with format '{format}': {source}")]
    TimestampParse {
        value: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid workflow status: '{0}'")]
    InvalidStatus(String),

    #[error("Malformed CircleCI response: {0}")]
    MalformedResponse(String),

    #[error("Workflows of pipeline {pipeline} are still running")]
    WorkflowRunning { pipeline: String },

    #[error("Workflows of pipeline {pipeline} do not all have the status {status}")]
    WorkflowStatus {
        pipeline: String,
        status: WorkflowStatus,
    },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No CircleCI API token configured (library was created for introspection only)")]
    MissingCredentials,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CircleCiError>;
