//! Core domain types for the game catalog.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - `GameId` alias so identifiers read as what they are
//! - `GameRecord`, one row of the catalog
//! - `GameIndex`, the in-memory table every other crate reads from

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a game (the Steam app id, kept as a string)
pub type GameId = String;

/// Maximum number of free-form tags kept per record
pub const MAX_TAGS: usize = 10;

/// Category string Steam uses to mark multiplayer support
pub const MULTIPLAYER_CATEGORY: &str = "Multi-player";

// =============================================================================
// Game Record
// =============================================================================

/// A single game in the catalog.
///
/// Prices are stored as integer cents. Use [`GameRecord::price`] to get the
/// plain USD number; nothing outside this crate should care about cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub name: String,
    /// Price in US cents. `None` when the catalog has no price for the game.
    pub price_cents: Option<u64>,
    pub genres: Vec<String>,
    pub categories: Vec<String>,
    pub positive_reviews: u64,
    pub negative_reviews: u64,
    /// Up to [`MAX_TAGS`] user tags, most voted first
    pub tags: Vec<String>,
}

impl GameRecord {
    /// Create a record with just an id and a name; everything else empty
    pub fn new(id: impl Into<GameId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price_cents: None,
            genres: Vec::new(),
            categories: Vec::new(),
            positive_reviews: 0,
            negative_reviews: 0,
            tags: Vec::new(),
        }
    }

    /// Price in USD as a plain number
    pub fn price(&self) -> Option<f64> {
        self.price_cents.map(|cents| cents as f64 / 100.0)
    }

    /// Does the record carry `genre`? Case-insensitive element match.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    /// Does the record carry `category`? Case-insensitive element match.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn is_multiplayer(&self) -> bool {
        self.has_category(MULTIPLAYER_CATEGORY)
    }

    /// Share of positive reviews, `None` when nobody reviewed the game
    pub fn review_ratio(&self) -> Option<f64> {
        let total = self.positive_reviews + self.negative_reviews;
        if total == 0 {
            None
        } else {
            Some(self.positive_reviews as f64 / total as f64)
        }
    }

    /// Boundary view with the price normalized to a plain USD number.
    ///
    /// This is what gets serialized into model prompts and CLI JSON output.
    pub fn view(&self) -> GameView<'_> {
        GameView {
            app_id: &self.id,
            name: &self.name,
            price: self.price(),
            genres: &self.genres,
            categories: &self.categories,
            positive_reviews: self.positive_reviews,
            negative_reviews: self.negative_reviews,
            tags: &self.tags,
        }
    }
}

/// Borrowed, serializable view of a [`GameRecord`]
#[derive(Debug, Serialize)]
pub struct GameView<'a> {
    pub app_id: &'a str,
    pub name: &'a str,
    pub price: Option<f64>,
    pub genres: &'a [String],
    pub categories: &'a [String],
    pub positive_reviews: u64,
    pub negative_reviews: u64,
    pub tags: &'a [String],
}

// =============================================================================
// GameIndex - The In-Memory Catalog
// =============================================================================

/// Main data structure that holds all game records and indices.
///
/// Point lookups are O(1) through the primary map. The genre index is keyed
/// by lowercased genre name so lookups don't depend on catalog casing.
#[derive(Debug, Default)]
pub struct GameIndex {
    pub(crate) games: HashMap<GameId, GameRecord>,
    /// Lowercased genre -> ids of games in that genre
    pub(crate) genre_index: HashMap<String, Vec<GameId>>,
}

impl GameIndex {
    /// Creates a new, empty GameIndex
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            genre_index: HashMap::new(),
        }
    }

    /// Get a game by id
    pub fn get_game(&self, id: &str) -> Option<&GameRecord> {
        self.games.get(id)
    }

    /// Get the ids of every game in a genre (case-insensitive, insertion order)
    ///
    /// Returns an empty slice for unknown genres
    pub fn get_games_by_genre(&self, genre: &str) -> &[GameId] {
        self.genre_index
            .get(&genre.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over every record (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.values()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Insert a game, replacing any previous record with the same id.
    ///
    /// Tags beyond [`MAX_TAGS`] are dropped here so every record in the
    /// index honours the limit no matter where it came from. The genre
    /// index is kept in step with the primary map.
    pub fn insert_game(&mut self, mut game: GameRecord) {
        game.tags.truncate(MAX_TAGS);
        if let Some(previous) = self.games.remove(&game.id) {
            self.unindex_genres(&previous);
        }

        let mut genres: Vec<String> = game.genres.iter().map(|g| g.to_lowercase()).collect();
        genres.sort();
        genres.dedup();
        for genre in genres {
            self.genre_index.entry(genre).or_default().push(game.id.clone());
        }
        self.games.insert(game.id.clone(), game);
    }

    fn unindex_genres(&mut self, game: &GameRecord) {
        for genre in &game.genres {
            let key = genre.to_lowercase();
            if let Some(ids) = self.genre_index.get_mut(&key) {
                ids.retain(|id| id != &game.id);
                if ids.is_empty() {
                    self.genre_index.remove(&key);
                }
            }
        }
    }
}
