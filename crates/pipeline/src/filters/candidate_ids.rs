//! Restrict results to an explicit set of ids (e.g. retrieval hits).

use crate::traits::Filter;
use anyhow::Result;
use data_loader::{GameId, GameRecord};
use std::collections::HashSet;

pub struct CandidateIdFilter {
    ids: HashSet<GameId>,
}

impl CandidateIdFilter {
    pub fn new(ids: impl IntoIterator<Item = GameId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl Filter for CandidateIdFilter {
    fn name(&self) -> &str {
        "CandidateIdFilter"
    }

    fn apply<'a>(&self, games: Vec<&'a GameRecord>) -> Result<Vec<&'a GameRecord>> {
        Ok(games
            .into_iter()
            .filter(|game| self.ids.contains(&game.id))
            .collect())
    }
}
