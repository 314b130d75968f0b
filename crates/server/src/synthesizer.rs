//! Merges worker outputs into the final answer.

use crate::error::SynthesisError;
use crate::orchestrator::format_history;
use crate::session::Turn;
use crate::system::WorkerOutcome;
use crate::workers::WorkerKind;
use llm_client::{LlmClient, LlmRequest};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

const SYSTEM_PROMPT: &str = "You are a friendly game recommendation assistant. \
Several specialised workers have researched the user's request; their raw outputs \
follow, one section per worker. Combine them into one clear answer. \
Prefer catalog recommendations for buying advice, use web results for recent news, \
and quote prices in USD with the approximate Korean won amount. \
If a worker reports an error, do not show the error itself, just work with what \
the other workers found and mention briefly that some information was unavailable. \
Answer in the language of the request.";

pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
    model: Option<String>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm, model: None }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Build the synthesis prompt; failed workers appear as `Error: ...`
    pub fn build_prompt(
        query: &str,
        results: &BTreeMap<WorkerKind, WorkerOutcome>,
        history: &[Turn],
    ) -> String {
        let mut prompt = String::new();
        if !history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            prompt.push_str(&format_history(history));
            prompt.push_str("\n\n");
        }
        prompt.push_str(&format!("Request: {}\n\nWorker results:\n", query));
        for (kind, outcome) in results {
            prompt.push_str(&format!("\n### {}\n{}\n", kind, outcome.context_text()));
        }
        prompt
    }

    #[instrument(skip_all, fields(workers = results.len()))]
    pub async fn synthesize(
        &self,
        query: &str,
        results: &BTreeMap<WorkerKind, WorkerOutcome>,
        history: &[Turn],
    ) -> Result<String, SynthesisError> {
        let mut request = LlmRequest::new(SYSTEM_PROMPT, Self::build_prompt(query, results, history));
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        Ok(self.llm.complete(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::StaticLlmClient;

    #[test]
    fn test_prompt_includes_failures() {
        let results = BTreeMap::from([
            (WorkerKind::GameInfo, WorkerOutcome::Completed("{\"status\":\"found\"}".to_string())),
            (WorkerKind::WebSearch, WorkerOutcome::Failed("timed out after 30s".to_string())),
        ]);

        let prompt = Synthesizer::build_prompt("zelda?", &results, &[]);
        assert!(prompt.contains("Request: zelda?"));
        assert!(prompt.contains("### GameInfoWorker\n{\"status\":\"found\"}"));
        assert!(prompt.contains("### WebSearchWorker\nError: timed out after 30s"));
        assert!(!prompt.contains("Conversation so far"));
    }

    #[test]
    fn test_prompt_includes_history() {
        let history = vec![Turn::new("퍼즐 게임 추천해줘", "Portal 2 어때요?")];
        let results = BTreeMap::from([(WorkerKind::KnowledgeBase, WorkerOutcome::Completed("ok".to_string()))]);

        let prompt = Synthesizer::build_prompt("더 싼 건?", &results, &history);
        assert!(prompt.starts_with("Conversation so far:\nUser: 퍼즐 게임 추천해줘\nAssistant: Portal 2 어때요?"));
    }

    #[tokio::test]
    async fn test_synthesize_returns_model_text() {
        let synthesizer = Synthesizer::new(Arc::new(StaticLlmClient::new("final answer")));
        let results = BTreeMap::from([(WorkerKind::KnowledgeBase, WorkerOutcome::Completed("x".to_string()))]);
        assert_eq!(synthesizer.synthesize("q", &results, &[]).await.unwrap(), "final answer");
    }
}
