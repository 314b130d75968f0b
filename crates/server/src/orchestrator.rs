//! # Orchestrator
//!
//! Turns a user query into an [`ExecutionPlan`]: which workers run, and what
//! task text each one receives.
//!
//! The planner model is asked for a JSON object, but its reply is treated
//! as untrusted free text. The payload is whatever lies between the first
//! `{` and the last `}`; if that is missing or does not decode, or if the
//! model call itself fails, the query goes to the knowledge-base worker
//! alone. [`Orchestrator::plan`] therefore never fails.

use crate::error::PlanParseError;
use crate::session::Turn;
use crate::workers::WorkerKind;
use llm_client::{LlmClient, LlmRequest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Worker that receives the whole query when no usable plan exists
pub const DEFAULT_WORKER: WorkerKind = WorkerKind::KnowledgeBase;

/// Workers to run and the task text for each
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionPlan {
    /// Known workers in plan order, each at most once
    pub workers: Vec<WorkerKind>,
    pub tasks: BTreeMap<WorkerKind, String>,
}

impl ExecutionPlan {
    /// The fallback plan: the whole query to the knowledge-base worker
    pub fn default_for(query: &str) -> Self {
        Self {
            workers: vec![DEFAULT_WORKER],
            tasks: BTreeMap::from([(DEFAULT_WORKER, query.to_string())]),
        }
    }

    /// Task text for `kind`, or the original query when the plan gave none
    pub fn task_for<'a>(&'a self, kind: WorkerKind, query: &'a str) -> &'a str {
        match self.tasks.get(&kind) {
            Some(task) if !task.trim().is_empty() => task.as_str(),
            _ => query,
        }
    }
}

/// Planner output as it appears on the wire
#[derive(Deserialize)]
struct RawPlan {
    workers: Vec<String>,
    #[serde(default)]
    tasks: HashMap<String, String>,
}

/// Decode a planner reply.
///
/// Unknown worker names are dropped and duplicates collapse to their first
/// occurrence; neither is an error.
pub fn parse_plan(raw: &str) -> Result<ExecutionPlan, PlanParseError> {
    let start = raw.find('{').ok_or(PlanParseError::NoPayload)?;
    let end = raw.rfind('}').ok_or(PlanParseError::NoPayload)?;
    if end < start {
        return Err(PlanParseError::NoPayload);
    }

    let parsed: RawPlan = serde_json::from_str(&raw[start..=end])?;

    let mut workers = Vec::new();
    for name in &parsed.workers {
        match WorkerKind::from_name(name) {
            Some(kind) if !workers.contains(&kind) => workers.push(kind),
            Some(_) => debug!(worker = %name, "Duplicate worker in plan collapsed"),
            None => debug!(worker = %name, "Unknown worker in plan skipped"),
        }
    }

    let tasks = parsed
        .tasks
        .into_iter()
        .filter_map(|(name, task)| WorkerKind::from_name(&name).map(|kind| (kind, task)))
        .filter(|(kind, _)| workers.contains(kind))
        .collect();

    Ok(ExecutionPlan { workers, tasks })
}

fn system_prompt() -> String {
    let mut prompt = String::from(
        "You are the planner of a game recommendation assistant. \
         Decide which workers should handle the user's request and write a focused task \
         for each one.\n\nAvailable workers:\n",
    );
    for kind in WorkerKind::ALL {
        prompt.push_str(&format!("- {}: {}\n", kind.name(), kind.description()));
    }
    prompt.push_str(
        "\nReply with a single JSON object and nothing else, for example:\n\
         {\"workers\": [\"KnowledgeBaseWorker\"], \
         \"tasks\": {\"KnowledgeBaseWorker\": \"퍼즐 게임 2만원 이하\"}}\n\
         Choose only from the workers above. Write tasks in the user's language and copy \
         any budget exactly as the user wrote it, amount and currency unchanged.",
    );
    prompt
}

/// Prior turns as prompt text, oldest first
pub(crate) fn format_history(history: &[Turn]) -> String {
    history
        .iter()
        .map(|turn| format!("User: {}\nAssistant: {}", turn.query, turn.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    model: Option<String>,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            model: None,
            system_prompt: system_prompt(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Plan `query`. Always returns a usable plan.
    #[instrument(skip(self, history), fields(history_turns = history.len()))]
    pub async fn plan(&self, query: &str, history: &[Turn]) -> ExecutionPlan {
        let user = if history.is_empty() {
            format!("Request: {}", query)
        } else {
            format!(
                "Conversation so far:\n{}\n\nRequest: {}",
                format_history(history),
                query
            )
        };

        let mut request = LlmRequest::new(self.system_prompt.clone(), user).with_temperature(0.0);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let raw = match self.llm.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Planner call failed, using default plan");
                return ExecutionPlan::default_for(query);
            }
        };

        match parse_plan(&raw) {
            Ok(plan) => {
                debug!(workers = ?plan.workers, "Planned");
                plan
            }
            Err(e) => {
                warn!(error = %e, "Planner output unusable, using default plan");
                ExecutionPlan::default_for(query)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::{LlmClientError, StaticLlmClient};
    use async_trait::async_trait;

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _request: LlmRequest) -> Result<String, LlmClientError> {
            Err(LlmClientError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_parse_plan_with_surrounding_prose() {
        let raw = r#"Sure! Here is the plan:
            {"workers": ["GameInfoWorker", "WebSearchWorker"],
             "tasks": {"GameInfoWorker": "zelda facts", "WebSearchWorker": "zelda news"}}
            Let me know if you need anything else."#;

        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.workers, vec![WorkerKind::GameInfo, WorkerKind::WebSearch]);
        assert_eq!(plan.tasks[&WorkerKind::GameInfo], "zelda facts");
    }

    #[test]
    fn test_parse_plan_drops_unknown_and_duplicate_workers() {
        let raw = r#"{"workers": ["ImageWorker", "KnowledgeBaseWorker", "KnowledgeBaseWorker"],
                      "tasks": {"ImageWorker": "draw", "KnowledgeBaseWorker": "cozy games"}}"#;

        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.workers, vec![WorkerKind::KnowledgeBase]);
        assert_eq!(plan.tasks.len(), 1);
    }

    #[test]
    fn test_parse_plan_errors() {
        assert!(matches!(parse_plan("no braces at all"), Err(PlanParseError::NoPayload)));
        assert!(matches!(parse_plan("} backwards {"), Err(PlanParseError::NoPayload)));
        assert!(matches!(parse_plan("{not json}"), Err(PlanParseError::InvalidJson(_))));
        assert!(matches!(parse_plan(r#"{"tasks": {}}"#), Err(PlanParseError::InvalidJson(_))));
    }

    #[test]
    fn test_task_falls_back_to_query() {
        let plan = parse_plan(
            r#"{"workers": ["GameInfoWorker", "KnowledgeBaseWorker"],
                "tasks": {"KnowledgeBaseWorker": "   "}}"#,
        )
        .unwrap();

        assert_eq!(plan.task_for(WorkerKind::GameInfo, "original"), "original");
        assert_eq!(plan.task_for(WorkerKind::KnowledgeBase, "original"), "original");
    }

    #[tokio::test]
    async fn test_plan_invalid_output_gives_default_plan() {
        let orchestrator = Orchestrator::new(Arc::new(StaticLlmClient::new("I think you want puzzles")));
        let plan = orchestrator.plan("2만원 이하 퍼즐 게임", &[]).await;

        assert_eq!(plan, ExecutionPlan::default_for("2만원 이하 퍼즐 게임"));
        assert_eq!(plan.workers, vec![WorkerKind::KnowledgeBase]);
        assert_eq!(plan.tasks[&WorkerKind::KnowledgeBase], "2만원 이하 퍼즐 게임");
    }

    #[tokio::test]
    async fn test_plan_model_failure_gives_default_plan() {
        let orchestrator = Orchestrator::new(Arc::new(FailingLlm));
        let plan = orchestrator.plan("zelda?", &[]).await;
        assert_eq!(plan, ExecutionPlan::default_for("zelda?"));
    }

    #[test]
    fn test_plan_serializes_with_worker_names() {
        let json = serde_json::to_value(ExecutionPlan::default_for("q")).unwrap();
        assert_eq!(json["workers"][0], "KnowledgeBaseWorker");
        assert_eq!(json["tasks"]["KnowledgeBaseWorker"], "q");
    }

    #[test]
    fn test_prompt_example_task_keeps_a_readable_budget() {
        let example = parse_plan(&system_prompt()).unwrap();
        let task = example.task_for(WorkerKind::KnowledgeBase, "");
        let hints = pipeline::QueryHints::extract(task, 1300.0);
        assert_eq!(hints.max_price, Some(15.38));
    }

    #[test]
    fn test_system_prompt_lists_every_worker() {
        let prompt = system_prompt();
        for kind in WorkerKind::ALL {
            assert!(prompt.contains(kind.name()));
        }
    }
}
