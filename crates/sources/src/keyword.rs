//! Keyword Retriever - in-process stand-in for the vector index
//!
//! Ranks catalog entries by weighted keyword overlap with the query.
//!
//! ## Algorithm
//! 1. Tokenize the query and expand Korean words into catalog keywords
//! 2. For every game (in parallel):
//!    - each query keyword found in the name scores 3.0
//!    - ... in the genres scores 2.0
//!    - ... in the tags scores 1.5
//!    - ... in the categories scores 1.0
//! 3. Boost matching games slightly by review volume
//! 4. Drop zero scores, sort best first, return the top `limit`

use crate::retriever::SemanticRetriever;
use crate::types::{RetrievalError, RetrievedCandidate};
use crate::vocabulary::{expand_token, tokenize};
use data_loader::{GameId, GameIndex, GameRecord};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

const NAME_WEIGHT: f32 = 3.0;
const GENRE_WEIGHT: f32 = 2.0;
const TAG_WEIGHT: f32 = 1.5;
const CATEGORY_WEIGHT: f32 = 1.0;

/// Pre-tokenized view of one game, built once when the retriever is created
struct GameDocument {
    id: GameId,
    snippet: String,
    name: HashSet<String>,
    genres: HashSet<String>,
    tags: HashSet<String>,
    categories: HashSet<String>,
    review_count: u64,
}

impl GameDocument {
    fn from_record(game: &GameRecord) -> Self {
        let tokens_of = |values: &[String]| -> HashSet<String> {
            values.iter().flat_map(|v| tokenize(v)).collect()
        };

        Self {
            id: game.id.clone(),
            snippet: build_snippet(game),
            name: tokenize(&game.name).into_iter().collect(),
            genres: tokens_of(&game.genres),
            tags: tokens_of(&game.tags),
            categories: tokens_of(&game.categories),
            review_count: game.positive_reviews + game.negative_reviews,
        }
    }

    fn score(&self, keywords: &[String], popularity_weight: f32) -> f32 {
        let mut score = 0.0;
        for keyword in keywords {
            if self.name.contains(keyword) {
                score += NAME_WEIGHT;
            }
            if self.genres.contains(keyword) {
                score += GENRE_WEIGHT;
            }
            if self.tags.contains(keyword) {
                score += TAG_WEIGHT;
            }
            if self.categories.contains(keyword) {
                score += CATEGORY_WEIGHT;
            }
        }
        if score > 0.0 {
            score *= 1.0 + popularity_weight * (1.0 + self.review_count as f32).log10();
        }
        score
    }
}

/// Keyword retriever over the shared game catalog
pub struct KeywordRetriever {
    documents: Vec<GameDocument>,

    /// How much review volume nudges the ranking (0 disables it)
    popularity_weight: f32,

    /// Candidates scoring below this are dropped
    min_score: f32,
}

impl KeywordRetriever {
    /// Build a retriever over every game in `index`
    pub fn new(index: Arc<GameIndex>) -> Self {
        let documents = index.iter().map(GameDocument::from_record).collect();
        Self {
            documents,
            popularity_weight: 0.05,
            min_score: 0.0,
        }
    }

    /// Configure the review-volume boost (default: 0.05)
    pub fn with_popularity_weight(mut self, weight: f32) -> Self {
        self.popularity_weight = weight.max(0.0);
        self
    }

    /// Configure the minimum score a candidate needs (default: 0.0)
    pub fn with_min_score(mut self, min: f32) -> Self {
        self.min_score = min;
        self
    }

    /// Query keywords after tokenization, expansion and dedup, in query order
    fn keywords(query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        tokenize(query)
            .iter()
            .flat_map(|token| expand_token(token))
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect()
    }
}

impl SemanticRetriever for KeywordRetriever {
    fn name(&self) -> &str {
        "KeywordRetriever"
    }

    #[instrument(skip(self), fields(documents = self.documents.len()))]
    fn retrieve(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedCandidate>, RetrievalError> {
        let keywords = Self::keywords(query);
        debug!("Expanded query into {} keywords: {:?}", keywords.len(), keywords);
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<RetrievedCandidate> = self
            .documents
            .par_iter()
            .filter_map(|doc| {
                let score = doc.score(&keywords, self.popularity_weight);
                (score > 0.0 && score >= self.min_score)
                    .then(|| RetrievedCandidate::new(doc.id.clone(), score, doc.snippet.clone()))
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        candidates.truncate(limit);

        debug!("Retrieved {} candidates", candidates.len());
        Ok(candidates)
    }
}

/// One-line summary of a game for model context
fn build_snippet(game: &GameRecord) -> String {
    let price = game
        .price()
        .map(|p| format!("${:.2}", p))
        .unwrap_or_else(|| "price unknown".to_string());
    format!(
        "{} ({}) - genres: {}; tags: {}",
        game.name,
        price,
        game.genres.join(", "),
        game.tags.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: &str, name: &str, genres: &[&str], tags: &[&str], reviews: u64) -> GameRecord {
        let mut record = GameRecord::new(id, name);
        record.genres = genres.iter().map(|s| s.to_string()).collect();
        record.tags = tags.iter().map(|s| s.to_string()).collect();
        record.positive_reviews = reviews;
        record.price_cents = Some(999);
        record
    }

    fn create_test_index() -> Arc<GameIndex> {
        Arc::new(GameIndex::from_games(vec![
            game("1", "Portal 2", &["Action", "Adventure"], &["Puzzle", "Co-op"], 1000),
            game("2", "Tetris Effect", &["Puzzle"], &["Relaxing"], 100),
            game("3", "Doom", &["Action"], &["Shooter"], 5000),
            game("4", "Stardew Valley", &["RPG", "Simulation"], &["Farming", "Relaxing"], 9000),
        ]))
    }

    #[test]
    fn test_retrieve_ranks_genre_over_tag() {
        let retriever = KeywordRetriever::new(create_test_index()).with_popularity_weight(0.0);

        let results = retriever.retrieve("puzzle", 10).unwrap();

        let ids: Vec<&str> = results.iter().map(|c| c.game_id.as_str()).collect();
        // Tetris has Puzzle as a genre (2.0), Portal only as a tag (1.5)
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_retrieve_expands_korean_terms() {
        let retriever = KeywordRetriever::new(create_test_index());

        let results = retriever.retrieve("힐링 게임 추천", 10).unwrap();

        let ids: Vec<&str> = results.iter().map(|c| c.game_id.as_str()).collect();
        assert!(ids.contains(&"2"));
        assert!(ids.contains(&"4"));
        assert!(!ids.contains(&"3"));
    }

    #[test]
    fn test_retrieve_respects_limit() {
        let retriever = KeywordRetriever::new(create_test_index());
        let results = retriever.retrieve("action puzzle relaxing", 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_retrieve_empty_and_stopword_queries() {
        let retriever = KeywordRetriever::new(create_test_index());
        assert!(retriever.retrieve("", 10).unwrap().is_empty());
        assert!(retriever.retrieve("game", 10).unwrap().is_empty());
        assert!(retriever.retrieve("zzzz", 10).unwrap().is_empty());
    }

    #[test]
    fn test_snippet_contains_price_and_genres() {
        let retriever = KeywordRetriever::new(create_test_index());
        let results = retriever.retrieve("doom", 1).unwrap();
        assert_eq!(results[0].game_id, "3");
        assert!(results[0].snippet.contains("$9.99"));
        assert!(results[0].snippet.contains("Action"));
    }
}
