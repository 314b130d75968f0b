//! # Sources Crate
//!
//! The outside capabilities workers draw information from.
//!
//! ## Components
//!
//! ### Semantic retrieval
//! - [`SemanticRetriever`]: "free text in, ranked game candidates out"
//! - [`KeywordRetriever`]: in-process implementation over the game catalog,
//!   with Korean -> English query expansion
//!
//! ### Web fetch
//! - [`HttpFetch`]: "URL in, page text out"
//! - [`ReqwestFetcher`]: implementation over a shared `reqwest::Client`
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{KeywordRetriever, SemanticRetriever};
//! use data_loader::GameIndex;
//! use std::sync::Arc;
//!
//! let index = Arc::new(GameIndex::load_from_file("data/games.json".as_ref())?);
//! let retriever = KeywordRetriever::new(index.clone());
//! for hit in retriever.retrieve("커플 협동 퍼즐 게임", 5)? {
//!     println!("{} {:.2} {}", hit.game_id, hit.score, hit.snippet);
//! }
//! ```

// Public modules
pub mod types;
pub mod vocabulary;
pub mod retriever;
pub mod keyword;
pub mod web;

// Re-export commonly used types
pub use types::{RetrievalError, RetrievedCandidate};
pub use retriever::SemanticRetriever;
pub use keyword::KeywordRetriever;
pub use web::{FetchError, HttpFetch, ReqwestFetcher};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{GameIndex, GameRecord};
    use std::sync::Arc;

    #[test]
    fn test_retriever_as_trait_object() {
        let mut game = GameRecord::new("1", "Baba Is You");
        game.genres = vec!["Puzzle".to_string()];
        let index = Arc::new(GameIndex::from_games(vec![game]));

        let retriever: Arc<dyn SemanticRetriever> = Arc::new(KeywordRetriever::new(index));
        assert_eq!(retriever.name(), "KeywordRetriever");

        let hits = retriever.retrieve("퍼즐", 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].game_id, "1");
    }

    #[test]
    fn test_candidate_creation() {
        let candidate = RetrievedCandidate::new("620", 0.85, "Portal 2");
        assert_eq!(candidate.game_id, "620");
        assert_eq!(candidate.score, 0.85);
    }
}
