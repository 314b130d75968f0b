//! Caller-facing recommendation service: sessions around the pipeline.

use crate::config::AssistantConfig;
use crate::error::ServiceError;
use crate::orchestrator::Orchestrator;
use crate::session::{SessionStore, Turn};
use crate::synthesizer::Synthesizer;
use crate::system::OrchestratorWorkersSystem;
use crate::workers::{GameInfoWorker, KnowledgeBaseWorker, WebSearchWorker, WorkerRegistry};
use data_loader::GameIndex;
use llm_client::{AnthropicClient, AnthropicConfig, LlmClient};
use pipeline::InMemoryMetadataStore;
use serde::Serialize;
use sources::{KeywordRetriever, ReqwestFetcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationResponse {
    pub answer: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionListing {
    pub total: usize,
    pub session_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub active_sessions: usize,
}

pub struct RecommendationService {
    system: Arc<OrchestratorWorkersSystem>,
    sessions: Arc<SessionStore>,
}

impl RecommendationService {
    pub fn new(system: Arc<OrchestratorWorkersSystem>, sessions: Arc<SessionStore>) -> Self {
        Self { system, sessions }
    }

    /// Wire the production stack: Anthropic models, keyword retrieval over
    /// `index`, the in-memory metadata store and a reqwest fetcher.
    pub fn from_config(config: &AssistantConfig, index: Arc<GameIndex>) -> Result<Self, ServiceError> {
        let mut llm_config = AnthropicConfig::new(config.require_api_key()?, config.worker_model.clone());
        llm_config.base_url = config.llm_base_url.clone();
        llm_config.max_tokens = config.max_tokens;
        llm_config.temperature = config.temperature;
        llm_config.timeout = config.worker_timeout;
        let llm: Arc<dyn LlmClient> = Arc::new(AnthropicClient::new(llm_config)?);

        let retriever = Arc::new(KeywordRetriever::new(index.clone()));
        let store = Arc::new(InMemoryMetadataStore::new(index));
        let fetcher = Arc::new(ReqwestFetcher::new(config.worker_timeout)?);

        let registry = WorkerRegistry::new()
            .register(Arc::new(GameInfoWorker::new()))
            .register(Arc::new(
                KnowledgeBaseWorker::new(retriever, store, llm.clone())
                    .with_model(config.worker_model.clone())
                    .with_exchange_rate(config.krw_per_usd)
                    .with_limits(config.retrieval_limit, config.filter_limit),
            ))
            .register(Arc::new(
                WebSearchWorker::new(fetcher, llm.clone(), config.web_search_url.clone())
                    .with_model(config.worker_model.clone())
                    .with_max_chars(config.web_max_chars),
            ));

        let system = OrchestratorWorkersSystem::new(
            Orchestrator::new(llm.clone()).with_model(config.planner_model.clone()),
            registry,
            Synthesizer::new(llm).with_model(config.synthesizer_model.clone()),
        )
        .with_dispatch_mode(config.dispatch_mode)
        .with_worker_timeout(config.worker_timeout);

        info!(
            mode = %config.dispatch_mode,
            timeout_secs = config.worker_timeout.as_secs(),
            "Recommendation service ready"
        );
        Ok(Self::new(
            Arc::new(system),
            Arc::new(SessionStore::new(config.max_turns)),
        ))
    }

    pub fn system(&self) -> &Arc<OrchestratorWorkersSystem> {
        &self.system
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer `query` within a session (a new one when `session_id` is `None`).
    ///
    /// The turn is remembered only when the pipeline succeeds.
    #[instrument(skip(self, query))]
    pub async fn recommend(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<RecommendationResponse, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::EmptyQuery);
        }

        let session_id = self.sessions.get_or_create(session_id);
        let history = self.sessions.history(&session_id);

        let answer = self.system.run_with_history(query, &history).await?;
        self.sessions.record_turn(&session_id, Turn::new(query, answer.clone()));

        Ok(RecommendationResponse { answer, session_id })
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), ServiceError> {
        Ok(self.sessions.delete(session_id)?)
    }

    pub fn list_sessions(&self) -> SessionListing {
        let session_ids = self.sessions.list();
        SessionListing {
            total: session_ids.len(),
            session_ids,
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            message: "Game recommendation service is running",
            active_sessions: self.sessions.len(),
        }
    }

    /// Start idle-session eviction when a TTL is configured
    pub fn start_session_sweeper(&self, ttl: Option<Duration>) -> Option<tokio::task::JoinHandle<()>> {
        ttl.map(|ttl| {
            let interval = (ttl / 4).max(Duration::from_secs(1));
            self.sessions.spawn_sweeper(ttl, interval)
        })
    }
}
