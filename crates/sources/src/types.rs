//! Types shared by every retrieval source.

use data_loader::GameId;
use serde::Serialize;
use thiserror::Error;

/// One hit from a semantic retriever, ranked by `score` (higher is better)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedCandidate {
    pub game_id: GameId,
    pub score: f32,
    /// Short human-readable summary used as model context
    pub snippet: String,
}

impl RetrievedCandidate {
    pub fn new(game_id: impl Into<GameId>, score: f32, snippet: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            score,
            snippet: snippet.into(),
        }
    }
}

/// Errors a retrieval backend can report
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Retrieval backend failed: {0}")]
    Backend(String),

    #[error("Invalid retrieval query: {0}")]
    InvalidQuery(String),
}
