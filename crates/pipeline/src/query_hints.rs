//! Reading attribute constraints out of a natural-language game request.
//!
//! Users write things like "2만원 이하 퍼즐 게임" or "co-op games under $20".
//! [`QueryHints::extract`] pulls the budget, genres and multiplayer wish out
//! of such text so the knowledge-base worker can ask the metadata store
//! precise questions. Korean won amounts are converted to USD at a
//! configurable rate and rounded to cents.

use crate::query::MetadataQuery;
use regex::{Captures, Regex};
use serde::Serialize;
use sources::vocabulary::{genres_in, wants_multiplayer};
use std::sync::LazyLock;

// Won amounts end in 원 or the English "won"/"KRW". The match ends at the
// `unit` group, not at the character checked after it.
static MAN_WON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+(?:\.\d+)?)\s*만\s*(?:(\d+(?:\.\d+)?)\s*천|(\d{1,4}))?\s*(?P<unit>원|(?i:won|krw))(?:[^A-Za-z]|$)",
    )
    .expect("valid regex")
});
// "만원" on its own, but not the particle in "퍼즐만 원해요"
static BARE_MAN_WON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^가-힣0-9.])만\s*(?P<unit>원)").expect("valid regex"));
static CHEON_WON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*천\s*(?P<unit>원|(?i:won|krw))(?:[^A-Za-z]|$)").expect("valid regex")
});
static WON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})+|\d+)\s*(?P<unit>원|(?i:won|krw))(?:[^A-Za-z]|$)").expect("valid regex")
});
static WON_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₩|(?i:krw))\s*(\d{1,3}(?:,\d{3})+|\d+)").expect("valid regex")
});
static DOLLAR_SIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*(\d+(?:\.\d+)?)").expect("valid regex"));
static DOLLAR_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:dollars?|usd|bucks|달러|불)").expect("valid regex")
});

/// Korean bound words follow the amount ("2만원 이하")
const KO_MAX_WORDS: &[&str] = &["이하", "미만", "까지", "아래", "안쪽"];
const KO_MIN_WORDS: &[&str] = &["이상", "초과", "넘는", "부터"];

/// English bound words precede the amount ("under $20"); the longest match wins
const EN_MAX_WORDS: &[&str] = &[
    "under",
    "below",
    "less than",
    "cheaper than",
    "no more than",
    "at most",
    "up to",
    "max",
];
const EN_MIN_WORDS: &[&str] = &["over", "above", "more than", "no less than", "at least", "min"];

/// Bounds that exclude the amount itself; they move the limit by one cent
const EXCLUSIVE_WORDS: &[&str] = &["미만", "초과", "less than", "cheaper than", "more than"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Max,
    Min,
}

/// A price mention found in the text
struct Amount {
    start: usize,
    end: usize,
    usd: f64,
}

/// Constraints found in a free-text request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryHints {
    pub max_price: Option<f64>,
    pub min_price: Option<f64>,
    pub genres: Vec<String>,
    pub multiplayer: bool,
}

impl QueryHints {
    /// Extract hints from `text`, converting won to USD at `krw_per_usd`.
    ///
    /// An amount with no direction word is read as a budget (maximum).
    pub fn extract(text: &str, krw_per_usd: f64) -> Self {
        let mut hints = QueryHints {
            genres: genres_in(text).into_iter().map(String::from).collect(),
            multiplayer: wants_multiplayer(text),
            ..Default::default()
        };

        for amount in find_amounts(text, krw_per_usd) {
            match bound_for(text, &amount) {
                (Bound::Max, exclusive) if hints.max_price.is_none() => {
                    let usd = if exclusive { (amount.usd - 0.01).max(0.0) } else { amount.usd };
                    hints.max_price = Some(round_cents(usd));
                }
                (Bound::Min, exclusive) if hints.min_price.is_none() => {
                    let usd = if exclusive { amount.usd + 0.01 } else { amount.usd };
                    hints.min_price = Some(round_cents(usd));
                }
                _ => {}
            }
        }

        hints
    }

    pub fn is_empty(&self) -> bool {
        self.max_price.is_none()
            && self.min_price.is_none()
            && self.genres.is_empty()
            && !self.multiplayer
    }

    /// The metadata query these hints describe
    pub fn to_query(&self) -> MetadataQuery {
        MetadataQuery {
            max_price: self.max_price,
            min_price: self.min_price,
            genres: self.genres.clone(),
            require_multiplayer: self.multiplayer.then_some(true),
            ..MetadataQuery::default()
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

/// Start and end of a match; the end stops at the currency unit when there is one
fn span(caps: &Captures) -> Option<(usize, usize)> {
    let whole = caps.get(0)?;
    let end = caps.name("unit").map_or(whole.end(), |unit| unit.end());
    Some((whole.start(), end))
}

fn number_at(caps: &Captures, group: usize) -> Option<f64> {
    caps.get(group).and_then(|m| parse_number(m.as_str()))
}

/// Every price mention in order of appearance, overlapping matches dropped
fn find_amounts(text: &str, krw_per_usd: f64) -> Vec<Amount> {
    let mut amounts = Vec::new();
    let won_to_usd = |won: f64| round_cents(won / krw_per_usd);
    let mut push = |caps: &Captures, usd: f64| {
        if let Some((start, end)) = span(caps) {
            amounts.push(Amount { start, end, usd });
        }
    };

    for caps in MAN_WON.captures_iter(text) {
        let Some(man) = number_at(&caps, 1) else { continue };
        // "1만5천원" / "1만 5000원"
        let rest = number_at(&caps, 2)
            .map(|cheon| cheon * 1_000.0)
            .or_else(|| number_at(&caps, 3))
            .unwrap_or(0.0);
        push(&caps, won_to_usd(man * 10_000.0 + rest));
    }
    for caps in BARE_MAN_WON.captures_iter(text) {
        push(&caps, won_to_usd(10_000.0));
    }
    for caps in CHEON_WON.captures_iter(text) {
        if let Some(cheon) = number_at(&caps, 1) {
            push(&caps, won_to_usd(cheon * 1_000.0));
        }
    }
    for re in [&*WON, &*WON_PREFIX] {
        for caps in re.captures_iter(text) {
            if let Some(won) = number_at(&caps, 1) {
                push(&caps, won_to_usd(won));
            }
        }
    }
    for re in [&*DOLLAR_SIGN, &*DOLLAR_WORD] {
        for caps in re.captures_iter(text) {
            if let Some(usd) = number_at(&caps, 1) {
                push(&caps, usd);
            }
        }
    }

    // longest match first among those starting at the same place
    amounts.sort_by_key(|a| (a.start, std::cmp::Reverse(a.end)));
    let mut last_end = 0;
    amounts.retain(|a| {
        let keep = a.start >= last_end;
        if keep {
            last_end = a.end;
        }
        keep
    });
    amounts
}

/// Which bound an amount sets, and whether the bound excludes the amount
fn bound_for(text: &str, amount: &Amount) -> (Bound, bool) {
    let after = text[amount.end..].trim_start();
    for (words, bound) in [(KO_MAX_WORDS, Bound::Max), (KO_MIN_WORDS, Bound::Min)] {
        if let Some(word) = words.iter().copied().find(|w| after.starts_with(w)) {
            return (bound, EXCLUSIVE_WORDS.contains(&word));
        }
    }

    let before = text[..amount.start].trim_end().to_lowercase();
    let english = EN_MAX_WORDS
        .iter()
        .map(|w| (*w, Bound::Max))
        .chain(EN_MIN_WORDS.iter().map(|w| (*w, Bound::Min)))
        .filter(|(w, _)| before.ends_with(w))
        .max_by_key(|(w, _)| w.len());
    if let Some((word, bound)) = english {
        return (bound, EXCLUSIVE_WORDS.contains(&word));
    }

    (Bound::Max, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 1300.0;

    #[test]
    fn test_korean_budget_and_genre() {
        let hints = QueryHints::extract("2만원 이하 퍼즐 게임", RATE);
        assert_eq!(hints.max_price, Some(15.38));
        assert_eq!(hints.min_price, None);
        assert_eq!(hints.genres, vec!["Puzzle".to_string()]);
        assert!(!hints.multiplayer);
    }

    #[test]
    fn test_won_forms() {
        assert_eq!(QueryHints::extract("5천원 이하", RATE).max_price, Some(3.85));
        assert_eq!(QueryHints::extract("15,000원짜리", RATE).max_price, Some(11.54));
        assert_eq!(QueryHints::extract("만원 이하", RATE).max_price, Some(7.69));
        assert_eq!(QueryHints::extract("1.5만원", RATE).max_price, Some(11.54));
    }

    #[test]
    fn test_compound_man_amounts() {
        let hints = QueryHints::extract("1만5천원 이하 퍼즐 게임", RATE);
        assert_eq!(hints.max_price, Some(11.54));
        assert_eq!(hints.genres, vec!["Puzzle".to_string()]);

        assert_eq!(QueryHints::extract("1만 5000원", RATE).max_price, Some(11.54));
        assert_eq!(QueryHints::extract("2만 5천 원 이상", RATE).min_price, Some(19.23));
    }

    #[test]
    fn test_english_won_amounts() {
        let hints = QueryHints::extract("puzzle games under 20,000 won", RATE);
        assert_eq!(hints.max_price, Some(15.38));
        assert_eq!(hints.genres, vec!["Puzzle".to_string()]);

        assert_eq!(QueryHints::extract("below 13000 KRW", RATE).max_price, Some(10.0));
        assert_eq!(QueryHints::extract("up to ₩26,000", RATE).max_price, Some(20.0));
        assert_eq!(QueryHints::extract("2만 won 이하", RATE).max_price, Some(15.38));
        // a word that merely starts with "won" is not a currency
        assert_eq!(QueryHints::extract("20 wonderful games", RATE).max_price, None);
    }

    #[test]
    fn test_man_particle_is_not_an_amount() {
        assert!(QueryHints::extract("퍼즐만 원해요", RATE).max_price.is_none());
    }

    #[test]
    fn test_exclusive_bounds_move_one_cent() {
        assert_eq!(QueryHints::extract("5천원 미만", RATE).max_price, Some(3.84));
        assert_eq!(QueryHints::extract("2만원 초과", RATE).min_price, Some(15.39));
        assert_eq!(QueryHints::extract("less than $10", RATE).max_price, Some(9.99));
        assert_eq!(QueryHints::extract("no more than $10", RATE).max_price, Some(10.0));
        assert_eq!(QueryHints::extract("no less than $10", RATE).min_price, Some(10.0));
        assert_eq!(QueryHints::extract("under $10", RATE).max_price, Some(10.0));
    }

    #[test]
    fn test_rate_is_configurable() {
        assert_eq!(QueryHints::extract("2만원 이하", 1000.0).max_price, Some(20.0));
    }

    #[test]
    fn test_minimum_words() {
        let hints = QueryHints::extract("3만원 이상 RPG", RATE);
        assert_eq!(hints.min_price, Some(23.08));
        assert_eq!(hints.max_price, None);
        assert_eq!(hints.genres, vec!["RPG".to_string()]);

        let hints = QueryHints::extract("strategy games over $30", RATE);
        assert_eq!(hints.min_price, Some(30.0));
    }

    #[test]
    fn test_dollar_forms() {
        assert_eq!(QueryHints::extract("under $20", RATE).max_price, Some(20.0));
        assert_eq!(QueryHints::extract("at most 12.5 dollars", RATE).max_price, Some(12.5));
        assert_eq!(QueryHints::extract("20 USD 이하", RATE).max_price, Some(20.0));
        // "$20 dollars" is one amount, not two
        let hints = QueryHints::extract("at least $20 dollars", RATE);
        assert_eq!(hints.min_price, Some(20.0));
        assert_eq!(hints.max_price, None);
    }

    #[test]
    fn test_range() {
        let hints = QueryHints::extract("1만원 이상 3만원 이하 액션", RATE);
        assert_eq!(hints.min_price, Some(7.69));
        assert_eq!(hints.max_price, Some(23.08));
        assert_eq!(hints.genres, vec!["Action".to_string()]);
    }

    #[test]
    fn test_multiplayer_and_query() {
        let hints = QueryHints::extract("커플이랑 할 퍼즐 게임 2만원 이하", RATE);
        assert!(hints.multiplayer);

        let query = hints.to_query();
        assert_eq!(query.max_price, Some(15.38));
        assert_eq!(query.require_multiplayer, Some(true));
        assert_eq!(query.genres, vec!["Puzzle".to_string()]);
    }

    #[test]
    fn test_no_hints() {
        let hints = QueryHints::extract("젤다 어때?", RATE);
        assert!(hints.is_empty());
        assert!(hints.to_query().is_unconstrained());
    }
}
