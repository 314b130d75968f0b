//! Error types for the orchestration core and the service around it.

use llm_client::LlmClientError;
use sources::{FetchError, RetrievalError};
use thiserror::Error;

/// Why a planner reply could not be turned into an execution plan.
///
/// Never leaves the orchestrator; it only decides the log line written
/// before falling back to the default plan.
#[derive(Error, Debug)]
pub enum PlanParseError {
    #[error("no JSON object found in planner output")]
    NoPayload,

    #[error("planner JSON is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A single worker failed to produce a result
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmClientError),

    #[error("web fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("metadata lookup failed: {0}")]
    Metadata(String),

    #[error("background task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("synthesis model call failed: {0}")]
    Llm(#[from] LlmClientError),
}

/// Whole-request failure of the orchestrator-workers pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors surfaced to callers of the recommendation service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build model client: {0}")]
    Client(#[from] LlmClientError),

    #[error("failed to build web fetcher: {0}")]
    Fetcher(#[from] FetchError),
}
