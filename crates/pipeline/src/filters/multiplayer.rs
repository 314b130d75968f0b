//! Keep games that list the Steam "Multi-player" category.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::GameRecord;

pub struct MultiplayerFilter;

impl Filter for MultiplayerFilter {
    fn name(&self) -> &str {
        "MultiplayerFilter"
    }

    fn apply<'a>(&self, games: Vec<&'a GameRecord>) -> Result<Vec<&'a GameRecord>> {
        Ok(games.into_iter().filter(|game| game.is_multiplayer()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplayer_filter() {
        let mut coop = GameRecord::new("1", "It Takes Two");
        coop.categories = vec!["Multi-player".to_string(), "Co-op".to_string()];
        let mut solo = GameRecord::new("2", "Celeste");
        solo.categories = vec!["Single-player".to_string()];

        let games = vec![coop, solo];
        let filtered = MultiplayerFilter.apply(games.iter().collect()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }
}
