//! Server crate for the game recommendation assistant.
//!
//! Contains the orchestration core (orchestrator, workers, synthesizer and
//! the pipeline that drives them) and the session-aware service callers
//! talk to.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod session;
pub mod synthesizer;
pub mod system;
pub mod workers;

pub use config::{AssistantConfig, DispatchMode};
pub use error::{
    ConfigError, PipelineError, PlanParseError, ServiceError, SessionError, SynthesisError, WorkerError,
};
pub use orchestrator::{parse_plan, ExecutionPlan, Orchestrator};
pub use service::{HealthStatus, RecommendationResponse, RecommendationService, SessionListing};
pub use session::{SessionStore, Turn};
pub use synthesizer::Synthesizer;
pub use system::{OrchestratorWorkersSystem, WorkerOutcome, NO_RESULTS_MESSAGE};
pub use workers::{Worker, WorkerKind, WorkerRegistry};
