//! Workers - each one fulfils one kind of sub-task with one capability.
//!
//! The set of workers is closed: [`WorkerKind`] names every variant the
//! planner may choose, and [`WorkerRegistry`] maps each kind to the instance
//! that executes it.

pub mod game_info;
pub mod knowledge_base;
pub mod web_search;

pub use game_info::GameInfoWorker;
pub use knowledge_base::KnowledgeBaseWorker;
pub use web_search::WebSearchWorker;

use crate::error::WorkerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a worker variant, as the planner writes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkerKind {
    #[serde(rename = "GameInfoWorker")]
    GameInfo,
    #[serde(rename = "KnowledgeBaseWorker")]
    KnowledgeBase,
    #[serde(rename = "WebSearchWorker")]
    WebSearch,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 3] = [
        WorkerKind::GameInfo,
        WorkerKind::KnowledgeBase,
        WorkerKind::WebSearch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WorkerKind::GameInfo => "GameInfoWorker",
            WorkerKind::KnowledgeBase => "KnowledgeBaseWorker",
            WorkerKind::WebSearch => "WebSearchWorker",
        }
    }

    /// Exact-name lookup; anything else is not a worker
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name.trim())
    }

    /// One-line description used in the planner prompt
    pub fn description(self) -> &'static str {
        match self {
            WorkerKind::GameInfo => {
                "facts about one specific, well-known game (developer, release year, platforms)"
            }
            WorkerKind::KnowledgeBase => {
                "recommendations from the game catalog by taste, budget, genre or player count"
            }
            WorkerKind::WebSearch => "recent news, reviews or anything the catalog cannot know",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared contract of every worker: task text in, result text out
#[async_trait]
pub trait Worker: Send + Sync {
    fn kind(&self) -> WorkerKind;

    async fn execute(&self, task: &str) -> Result<String, WorkerError>;
}

/// The worker instance behind each kind
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    workers: HashMap<WorkerKind, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker under its own kind, replacing any previous one
    pub fn register(mut self, worker: Arc<dyn Worker>) -> Self {
        self.workers.insert(worker.kind(), worker);
        self
    }

    pub fn get(&self, kind: WorkerKind) -> Option<Arc<dyn Worker>> {
        self.workers.get(&kind).cloned()
    }

    /// Registered kinds in enumeration order
    pub fn kinds(&self) -> Vec<WorkerKind> {
        WorkerKind::ALL
            .into_iter()
            .filter(|kind| self.workers.contains_key(kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
