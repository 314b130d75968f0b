//! Game facts from a fixed in-process table.

use super::{Worker, WorkerKind};
use crate::error::WorkerError;
use async_trait::async_trait;
use serde_json::json;

/// One known title and the lowercase substrings that identify it
struct GameFacts {
    keys: &'static [&'static str],
    title: &'static str,
    developer: &'static str,
    year: u16,
    genres: &'static [&'static str],
    platforms: &'static [&'static str],
}

/// Checked in order; the first entry with a matching key wins
const KNOWN_GAMES: &[GameFacts] = &[
    GameFacts {
        keys: &["zelda", "젤다"],
        title: "The Legend of Zelda: Breath of the Wild",
        developer: "Nintendo EPD",
        year: 2017,
        genres: &["Action", "Adventure", "Open World"],
        platforms: &["Nintendo Switch", "Wii U"],
    },
    GameFacts {
        keys: &["elden ring", "엘든 링", "엘든링"],
        title: "Elden Ring",
        developer: "FromSoftware",
        year: 2022,
        genres: &["Action RPG", "Open World"],
        platforms: &["PC", "PlayStation 4", "PlayStation 5", "Xbox One", "Xbox Series X/S"],
    },
    GameFacts {
        keys: &["stardew", "스타듀"],
        title: "Stardew Valley",
        developer: "ConcernedApe",
        year: 2016,
        genres: &["Simulation", "RPG"],
        platforms: &["PC", "Nintendo Switch", "PlayStation 4", "Xbox One", "Mobile"],
    },
    GameFacts {
        keys: &["it takes two", "잇 테이크 투"],
        title: "It Takes Two",
        developer: "Hazelight Studios",
        year: 2021,
        genres: &["Action", "Adventure", "Co-op"],
        platforms: &["PC", "PlayStation 4", "PlayStation 5", "Xbox One", "Xbox Series X/S", "Nintendo Switch"],
    },
    GameFacts {
        keys: &["portal", "포탈"],
        title: "Portal 2",
        developer: "Valve",
        year: 2011,
        genres: &["Puzzle", "Platformer"],
        platforms: &["PC", "PlayStation 3", "Xbox 360", "Nintendo Switch"],
    },
];

/// Looks up well-known titles mentioned in the task.
///
/// A miss is a normal `not_found` result, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameInfoWorker;

impl GameInfoWorker {
    pub fn new() -> Self {
        Self
    }

    fn lookup(task: &str) -> Option<&'static GameFacts> {
        let task = task.to_lowercase();
        KNOWN_GAMES
            .iter()
            .find(|facts| facts.keys.iter().any(|key| task.contains(key)))
    }
}

#[async_trait]
impl Worker for GameInfoWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::GameInfo
    }

    async fn execute(&self, task: &str) -> Result<String, WorkerError> {
        let result = match Self::lookup(task) {
            Some(facts) => json!({
                "status": "found",
                "title": facts.title,
                "developer": facts.developer,
                "year": facts.year,
                "genres": facts.genres,
                "platforms": facts.platforms,
            }),
            None => json!({
                "status": "not_found",
                "query": task,
            }),
        };
        Ok(result.to_string())
    }
}
