//! # Orchestrator-Workers system
//!
//! Drives one request through the pipeline:
//! 1. Plan: ask the orchestrator which workers to run (never fails)
//! 2. Dispatch: run every known worker named in the plan, each with its own
//!    timeout; failures are captured per worker and never abort the others
//! 3. Synthesize: merge the results into one answer, or return
//!    [`NO_RESULTS_MESSAGE`] without calling the model when nothing ran
//!
//! Only a synthesis failure fails the whole request.

use crate::config::DispatchMode;
use crate::error::PipelineError;
use crate::orchestrator::{ExecutionPlan, Orchestrator};
use crate::session::Turn;
use crate::synthesizer::Synthesizer;
use crate::workers::{Worker, WorkerKind, WorkerRegistry};
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Returned when the plan named no worker that could run
pub const NO_RESULTS_MESSAGE: &str =
    "No results were produced for this request. Please try rephrasing your question.";

/// What one worker contributed to a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Completed(String),
    Failed(String),
}

impl WorkerOutcome {
    /// Text handed to the synthesizer
    pub fn context_text(&self) -> String {
        match self {
            WorkerOutcome::Completed(text) => text.clone(),
            WorkerOutcome::Failed(message) => format!("Error: {}", message),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WorkerOutcome::Failed(_))
    }
}

pub struct OrchestratorWorkersSystem {
    orchestrator: Orchestrator,
    registry: WorkerRegistry,
    synthesizer: Synthesizer,
    dispatch_mode: DispatchMode,
    worker_timeout: Duration,
}

impl OrchestratorWorkersSystem {
    pub fn new(orchestrator: Orchestrator, registry: WorkerRegistry, synthesizer: Synthesizer) -> Self {
        Self {
            orchestrator,
            registry,
            synthesizer,
            dispatch_mode: DispatchMode::default(),
            worker_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }

    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = timeout;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Answer a one-off query
    pub async fn run(&self, query: &str) -> Result<String, PipelineError> {
        self.run_with_history(query, &[]).await
    }

    /// Answer a query in the context of earlier turns
    #[instrument(skip(self, history), fields(mode = %self.dispatch_mode))]
    pub async fn run_with_history(&self, query: &str, history: &[Turn]) -> Result<String, PipelineError> {
        let start = Instant::now();

        let plan = self.orchestrator.plan(query, history).await;
        info!(workers = ?plan.workers, "Execution plan ready");

        let results = self.dispatch(&plan, query).await;
        if results.is_empty() {
            info!("No worker produced a result");
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }

        let failed = results.values().filter(|o| o.is_failed()).count();
        info!(completed = results.len() - failed, failed, "Dispatch finished");

        let answer = self
            .synthesizer
            .synthesize(query, &results, history)
            .await
            .map_err(|e| {
                error!(error = %e, "Synthesis failed");
                PipelineError::from(e)
            })?;

        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Request answered");
        Ok(answer)
    }

    /// Run every known worker named in `plan`.
    ///
    /// Unknown or unregistered workers are skipped. Each worker gets the
    /// plan's task for it, or `query` when the plan has none.
    pub async fn dispatch(&self, plan: &ExecutionPlan, query: &str) -> BTreeMap<WorkerKind, WorkerOutcome> {
        let mut jobs: Vec<(WorkerKind, Arc<dyn Worker>, &str)> = Vec::new();
        for &kind in &plan.workers {
            if jobs.iter().any(|(k, _, _)| *k == kind) {
                continue;
            }
            match self.registry.get(kind) {
                Some(worker) => jobs.push((kind, worker, plan.task_for(kind, query))),
                None => debug!(worker = %kind, "No worker registered, skipping"),
            }
        }

        let mut results = BTreeMap::new();
        match self.dispatch_mode {
            DispatchMode::Concurrent => {
                let runs = jobs
                    .into_iter()
                    .map(|(kind, worker, task)| async move { (kind, self.execute_one(kind, worker, task).await) });
                results.extend(join_all(runs).await);
            }
            DispatchMode::Sequential => {
                for (kind, worker, task) in jobs {
                    let outcome = self.execute_one(kind, worker, task).await;
                    results.insert(kind, outcome);
                }
            }
        }
        results
    }

    async fn execute_one(&self, kind: WorkerKind, worker: Arc<dyn Worker>, task: &str) -> WorkerOutcome {
        let start = Instant::now();
        debug!(worker = %kind, task, "Dispatching");

        let outcome = match tokio::time::timeout(self.worker_timeout, worker.execute(task)).await {
            Ok(Ok(text)) => WorkerOutcome::Completed(text),
            Ok(Err(e)) => {
                warn!(worker = %kind, error = %e, "Worker failed");
                WorkerOutcome::Failed(e.to_string())
            }
            Err(_) => {
                warn!(worker = %kind, timeout = ?self.worker_timeout, "Worker timed out");
                WorkerOutcome::Failed(format!("timed out after {:?}", self.worker_timeout))
            }
        };

        debug!(worker = %kind, elapsed_ms = start.elapsed().as_millis() as u64, "Worker finished");
        outcome
    }
}
