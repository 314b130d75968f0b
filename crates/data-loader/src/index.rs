//! GameIndex building and indexing logic.
//!
//! - Load and parse the catalog file
//! - Validate data integrity before anything queries it

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl GameIndex {
    /// Load the whole catalog from a Steam `games.json` file
    ///
    /// Steps:
    /// 1. Parse every record (in parallel)
    /// 2. Insert into the primary map and the genre index
    /// 3. Validate
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading game catalog from {:?}", path);

        let games = parser::parse_games(path)?;
        info!("Parsed {} game records", games.len());

        let index = GameIndex::from_games(games);
        index.validate()?;

        info!(
            games = index.len(),
            genres = index.genre_index.len(),
            "GameIndex built and validated"
        );
        Ok(index)
    }

    /// Build an index straight from records (tests, small fixtures)
    pub fn from_games(games: impl IntoIterator<Item = GameRecord>) -> Self {
        let mut index = GameIndex::new();
        for game in games {
            index.insert_game(game);
        }
        index
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - every record has a non-empty id that matches its key
    /// - no record carries more than MAX_TAGS tags
    /// - every genre index entry points at a stored record
    pub fn validate(&self) -> Result<()> {
        for (key, game) in &self.games {
            if game.id.trim().is_empty() {
                return Err(DataLoadError::InvalidValue {
                    field: "app_id".to_string(),
                    value: game.id.clone(),
                });
            }
            if key != &game.id {
                return Err(DataLoadError::ValidationError(format!(
                    "record stored under {} carries id {}",
                    key, game.id
                )));
            }
            if game.tags.len() > MAX_TAGS {
                return Err(DataLoadError::ValidationError(format!(
                    "record {} has {} tags (max {})",
                    game.id,
                    game.tags.len(),
                    MAX_TAGS
                )));
            }
        }
        for (genre, ids) in &self.genre_index {
            if let Some(missing) = ids.iter().find(|id| !self.games.contains_key(*id)) {
                return Err(DataLoadError::ValidationError(format!(
                    "genre index {} lists unknown game {}",
                    genre, missing
                )));
            }
        }
        Ok(())
    }
}
