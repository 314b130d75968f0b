//! Parser for the Steam games catalog.
//!
//! The catalog is the Kaggle "Steam games" dump: one JSON object keyed by app id.
//!
//! ```text
//! {
//!   "10": {
//!     "name": "Counter-Strike",
//!     "price": 9.99,
//!     "genres": ["Action"],
//!     "categories": ["Multi-player", "PvP"],
//!     "positive": 124534,
//!     "negative": 3339,
//!     "tags": {"FPS": 90076, "Shooter": 64786}
//!   }
//! }
//! ```
//!
//! `tags` shows up either as a list or as an object of tag -> votes. Object
//! tags are ordered by votes (most voted first) before the top 10 are kept.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Parse a catalog file from disk
pub fn parse_games(path: &Path) -> Result<Vec<GameRecord>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_games_str(&content)
}

/// Parse catalog JSON already held in memory
///
/// Records are independent of each other, so they are parsed in parallel.
/// The first bad record aborts the whole parse.
pub fn parse_games_str(content: &str) -> Result<Vec<GameRecord>> {
    let root: Value = serde_json::from_str(content)?;
    let Value::Object(entries) = root else {
        return Err(DataLoadError::ValidationError(
            "catalog root must be an object keyed by app id".to_string(),
        ));
    };

    let entries: Vec<(String, Value)> = entries.into_iter().collect();
    entries
        .into_par_iter()
        .map(|(app_id, value)| parse_record(&app_id, &value))
        .collect()
}

/// Parse one catalog entry
fn parse_record(app_id: &str, value: &Value) -> Result<GameRecord> {
    let Value::Object(fields) = value else {
        return Err(DataLoadError::ParseError {
            record: app_id.to_string(),
            reason: "entry is not an object".to_string(),
        });
    };

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    Ok(GameRecord {
        id: app_id.to_string(),
        name,
        price_cents: parse_price(fields.get("price"))?,
        genres: parse_string_list(fields.get("genres")),
        categories: parse_string_list(fields.get("categories")),
        positive_reviews: parse_count(fields, "positive"),
        negative_reviews: parse_count(fields, "negative"),
        tags: parse_tags(fields.get("tags")),
    })
}

/// Convert a USD price into integer cents
///
/// Example: 9.99 -> Some(999), missing/null -> None, -1.0 -> Err
fn parse_price(value: Option<&Value>) -> Result<Option<u64>> {
    let price = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("free") => Some(0.0),
        Some(Value::String(s)) => s.trim().trim_start_matches('$').parse::<f64>().ok(),
        Some(_) => None,
    };

    match price {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(Some((p * 100.0).round() as u64)),
        _ => Err(DataLoadError::InvalidValue {
            field: "price".to_string(),
            value: value.map(|v| v.to_string()).unwrap_or_default(),
        }),
    }
}

/// Review counts; anything missing or malformed counts as zero
fn parse_count(fields: &Map<String, Value>, key: &str) -> u64 {
    fields
        .get(key)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
        .unwrap_or(0)
}

/// A list of strings; non-list values become an empty list
fn parse_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Tags as a list, or as an object of tag -> votes ordered by votes
fn parse_tags(value: Option<&Value>) -> Vec<String> {
    let mut tags = match value {
        Some(Value::Object(votes)) => {
            let mut ranked: Vec<(&String, u64)> = votes
                .iter()
                .map(|(tag, count)| (tag, count.as_u64().unwrap_or(0)))
                .collect();
            // Stable sort keeps the map's key order for equal vote counts
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            ranked.into_iter().map(|(tag, _)| tag.clone()).collect()
        }
        other => parse_string_list(other),
    };
    tags.truncate(MAX_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some(&serde_json::json!(9.99))).unwrap(), Some(999));
        assert_eq!(parse_price(Some(&serde_json::json!(0))).unwrap(), Some(0));
        assert_eq!(parse_price(Some(&serde_json::json!("Free"))).unwrap(), Some(0));
        assert_eq!(parse_price(None).unwrap(), None);
        assert!(parse_price(Some(&serde_json::json!(-1.0))).is_err());
        assert!(parse_price(Some(&serde_json::json!("cheap"))).is_err());
    }

    #[test]
    fn test_parse_tags_orders_by_votes() {
        let tags = serde_json::json!({"Indie": 10, "Puzzle": 50, "Casual": 30});
        assert_eq!(parse_tags(Some(&tags)), vec!["Puzzle", "Casual", "Indie"]);
    }

    #[test]
    fn test_parse_tags_keeps_top_ten() {
        let tags: Vec<String> = (0..15).map(|i| format!("tag{}", i)).collect();
        let parsed = parse_tags(Some(&serde_json::json!(tags)));
        assert_eq!(parsed.len(), MAX_TAGS);
        assert_eq!(parsed[0], "tag0");
    }

    #[test]
    fn test_parse_games_str() {
        let content = r#"{
            "620": {
                "name": "Portal 2",
                "price": 9.99,
                "genres": ["Action", "Adventure"],
                "categories": ["Single-player", "Multi-player", "Co-op"],
                "positive": 300000,
                "negative": 3000,
                "tags": {"Puzzle": 900, "Co-op": 800}
            },
            "42": {"genres": "not a list"}
        }"#;

        let mut games = parse_games_str(content).unwrap();
        games.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, "42");
        assert_eq!(games[0].name, "Unknown");
        assert!(games[0].genres.is_empty());
        assert_eq!(games[0].price_cents, None);

        let portal = &games[1];
        assert_eq!(portal.name, "Portal 2");
        assert_eq!(portal.price_cents, Some(999));
        assert!(portal.is_multiplayer());
        assert_eq!(portal.tags, vec!["Puzzle", "Co-op"]);
        assert_eq!(portal.positive_reviews, 300000);
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let result = parse_games_str("[1, 2, 3]");
        assert!(matches!(result, Err(DataLoadError::ValidationError(_))));
    }

    #[test]
    fn test_parse_reports_bad_record() {
        let result = parse_games_str(r#"{"7": {"name": "Bad", "price": -5}}"#);
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));
    }
}
