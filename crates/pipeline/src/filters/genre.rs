//! Keep games that carry every requested genre.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::GameRecord;

/// Conjunctive genre match; case-insensitive element equality, so "rpg"
/// matches "RPG" but "Action" does not match "Action RPG".
pub struct GenreFilter {
    genres: Vec<String>,
}

impl GenreFilter {
    pub fn new(genres: Vec<String>) -> Self {
        Self { genres }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply<'a>(&self, games: Vec<&'a GameRecord>) -> Result<Vec<&'a GameRecord>> {
        Ok(games
            .into_iter()
            .filter(|game| self.genres.iter().all(|genre| game.has_genre(genre)))
            .collect())
    }
}
