//! # Data Loader Crate
//!
//! This crate handles loading and indexing the Steam game catalog that backs
//! the metadata store.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (GameRecord, GameIndex)
//! - **parser**: Parse the Kaggle `games.json` dump into Rust structs
//! - **index**: Load and validate the catalog
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::GameIndex;
//! use std::path::Path;
//!
//! let index = GameIndex::load_from_file(Path::new("data/games.json"))?;
//! let portal = index.get_game("620").unwrap();
//! println!("{} costs ${:.2}", portal.name, portal.price().unwrap_or(0.0));
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{GameId, GameIndex, GameRecord, GameView, MAX_TAGS, MULTIPLAYER_CATEGORY};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> GameRecord {
        GameRecord {
            id: "413150".to_string(),
            name: "Stardew Valley".to_string(),
            price_cents: Some(1499),
            genres: vec!["Indie".to_string(), "RPG".to_string(), "Simulation".to_string()],
            categories: vec!["Single-player".to_string(), "Multi-player".to_string()],
            positive_reviews: 90,
            negative_reviews: 10,
            tags: vec!["Farming Sim".to_string()],
        }
    }

    #[test]
    fn test_game_index_creation() {
        let index = GameIndex::new();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_insert_game() {
        let mut index = GameIndex::new();
        index.insert_game(sample_game());

        let retrieved = index.get_game("413150").unwrap();
        assert_eq!(retrieved.name, "Stardew Valley");
        assert_eq!(retrieved.price(), Some(14.99));
        assert!(retrieved.is_multiplayer());
        assert!(retrieved.has_genre("rpg"));
    }

    #[test]
    fn test_insert_truncates_tags() {
        let mut game = sample_game();
        game.tags = (0..20).map(|i| format!("tag{}", i)).collect();

        let mut index = GameIndex::new();
        index.insert_game(game);
        assert_eq!(index.get_game("413150").unwrap().tags.len(), MAX_TAGS);
    }

    #[test]
    fn test_review_ratio() {
        assert_eq!(sample_game().review_ratio(), Some(0.9));
        assert_eq!(GameRecord::new("1", "Unreviewed").review_ratio(), None);
    }

    #[test]
    fn test_view_normalizes_price() {
        let game = sample_game();
        let json = serde_json::to_value(game.view()).unwrap();
        assert_eq!(json["app_id"], "413150");
        assert_eq!(json["price"], 14.99);
    }

    #[test]
    fn test_empty_queries() {
        let index = GameIndex::new();

        // Querying non-existent data should return None or empty slices
        assert!(index.get_game("999").is_none());
        assert!(index.get_games_by_genre("Action").is_empty());
    }
}
