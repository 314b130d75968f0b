//! Catalog recommendations: semantic retrieval narrowed by exact filtering.
//!
//! ## Algorithm
//! 1. Read budget / genre / multiplayer hints out of the task text
//! 2. Retrieve candidates for the task (blocking thread)
//! 3. Filter the candidates by the hints through the metadata store
//! 4. Nothing left? Filter the whole catalog by the hints alone
//! 5. Ask the worker model to recommend from the surviving records

use super::{Worker, WorkerKind};
use crate::error::WorkerError;
use async_trait::async_trait;
use data_loader::GameRecord;
use llm_client::{LlmClient, LlmRequest};
use pipeline::{MetadataQuery, MetadataStore, QueryHints};
use serde_json::{json, Value};
use sources::SemanticRetriever;
use std::sync::Arc;
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str = "You are a game recommendation expert. \
Recommend 3 to 5 games from the catalog records you are given, best value first, \
and take review counts into account. For each game give the title, the price in USD \
with the approximate Korean won amount, the genres, whether it supports multiplayer, \
and one sentence on why it fits the request. Only recommend games that appear in the \
records. If there are no records, say that nothing in the catalog matched and suggest \
how the user could loosen the request. Answer in the language of the request.";

pub struct KnowledgeBaseWorker {
    retriever: Arc<dyn SemanticRetriever>,
    store: Arc<dyn MetadataStore>,
    llm: Arc<dyn LlmClient>,
    model: Option<String>,
    krw_per_usd: f64,
    retrieval_limit: usize,
    filter_limit: usize,
}

impl KnowledgeBaseWorker {
    pub fn new(
        retriever: Arc<dyn SemanticRetriever>,
        store: Arc<dyn MetadataStore>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            retriever,
            store,
            llm,
            model: None,
            krw_per_usd: 1300.0,
            retrieval_limit: 20,
            filter_limit: pipeline::DEFAULT_LIMIT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_exchange_rate(mut self, krw_per_usd: f64) -> Self {
        self.krw_per_usd = krw_per_usd;
        self
    }

    pub fn with_limits(mut self, retrieval_limit: usize, filter_limit: usize) -> Self {
        self.retrieval_limit = retrieval_limit;
        self.filter_limit = filter_limit;
        self
    }

    /// Steps 1-4: the catalog records the answer will be built from
    #[instrument(skip(self), fields(retrieval_limit = self.retrieval_limit))]
    pub async fn find_games(&self, task: &str) -> Result<(QueryHints, Vec<GameRecord>), WorkerError> {
        let hints = QueryHints::extract(task, self.krw_per_usd);
        debug!(?hints, "Extracted query hints");

        let candidates = {
            let retriever = self.retriever.clone();
            let task = task.to_string();
            let limit = self.retrieval_limit;
            tokio::task::spawn_blocking(move || retriever.retrieve(&task, limit))
                .await
                .map_err(|e| WorkerError::Task(e.to_string()))??
        };
        debug!("Retrieved {} candidates", candidates.len());

        let mut games = Vec::new();
        if !candidates.is_empty() {
            let query = hints
                .to_query()
                .with_candidate_ids(candidates.into_iter().map(|c| c.game_id))
                .with_limit(self.filter_limit);
            games = self.filter(query).await?;
            debug!("{} candidates passed the hint filters", games.len());
        }

        if games.is_empty() && !hints.is_empty() {
            let query = hints.to_query().with_limit(self.filter_limit);
            games = self.filter(query).await?;
            debug!("Catalog-wide hint filter found {} games", games.len());
        }

        Ok((hints, games))
    }

    async fn filter(&self, query: MetadataQuery) -> Result<Vec<GameRecord>, WorkerError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.filter_by_attributes(&query))
            .await
            .map_err(|e| WorkerError::Task(e.to_string()))?
            .map_err(|e| WorkerError::Metadata(format!("{:#}", e)))
    }

    /// A record as the worker model sees it: USD price plus a won estimate
    fn record_context(&self, game: &GameRecord) -> Value {
        let price = game.price();
        json!({
            "app_id": game.id,
            "name": game.name,
            "price_usd": price,
            "price_krw_estimate": price.map(|usd| (usd * self.krw_per_usd).round() as u64),
            "genres": game.genres,
            "categories": game.categories,
            "multiplayer": game.is_multiplayer(),
            "positive_reviews": game.positive_reviews,
            "negative_reviews": game.negative_reviews,
            "tags": game.tags,
        })
    }
}

#[async_trait]
impl Worker for KnowledgeBaseWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::KnowledgeBase
    }

    async fn execute(&self, task: &str) -> Result<String, WorkerError> {
        let (hints, games) = self.find_games(task).await?;

        let records: Vec<Value> = games.iter().map(|g| self.record_context(g)).collect();
        let user = format!(
            "Request: {}\n\nConstraints understood from the request: {}\n\n\
             Catalog records ({} found, 1 USD = {} KRW):\n{:#}",
            task,
            json!(hints),
            records.len(),
            self.krw_per_usd,
            Value::Array(records),
        );

        let mut request = LlmRequest::new(SYSTEM_PROMPT, user);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        Ok(self.llm.complete(request).await?)
    }
}
