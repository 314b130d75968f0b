//! Shared query vocabulary.
//!
//! Users ask in Korean or English; the catalog speaks Steam's English genre
//! and tag names. These tables bridge the two and are used both by the
//! keyword retriever (query expansion) and by the metadata query hints.

/// Query term -> Steam genre name
pub const GENRE_TERMS: &[(&str, &str)] = &[
    ("퍼즐", "Puzzle"),
    ("puzzle", "Puzzle"),
    ("액션", "Action"),
    ("action", "Action"),
    ("어드벤처", "Adventure"),
    ("모험", "Adventure"),
    ("adventure", "Adventure"),
    ("롤플레잉", "RPG"),
    ("rpg", "RPG"),
    ("전략", "Strategy"),
    ("strategy", "Strategy"),
    ("시뮬레이션", "Simulation"),
    ("simulation", "Simulation"),
    ("캐주얼", "Casual"),
    ("casual", "Casual"),
    ("인디", "Indie"),
    ("indie", "Indie"),
    ("레이싱", "Racing"),
    ("racing", "Racing"),
    ("스포츠", "Sports"),
    ("sports", "Sports"),
];

/// Terms that mean "I want to play with someone else"
pub const MULTIPLAYER_TERMS: &[&str] = &[
    "멀티",
    "협동",
    "커플",
    "친구",
    "2인",
    "co-op",
    "coop",
    "multiplayer",
    "multi-player",
];

/// Korean query words -> English catalog keywords, for retrieval only
const KEYWORD_SYNONYMS: &[(&str, &[&str])] = &[
    ("힐링", &["relaxing", "casual", "cute"]),
    ("커플", &["co-op", "multi-player"]),
    ("협동", &["co-op"]),
    ("멀티", &["multi-player"]),
    ("공포", &["horror"]),
    ("귀여운", &["cute"]),
    ("농장", &["farming"]),
    ("생존", &["survival"]),
    ("오픈월드", &["open", "world"]),
    ("로그라이크", &["roguelike"]),
    ("슈팅", &["shooter"]),
];

/// Words too common in game questions to say anything about a game
pub const STOPWORDS: &[&str] = &["game", "games", "게임", "추천", "recommend", "the", "a", "for"];

/// Split text into lowercase word tokens.
///
/// Hyphens inside a word are kept so "Multi-player" and "co-op" survive as
/// single tokens. Hangul counts as alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|t| t.trim_matches('-').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Does `term` occur in `text`?
///
/// Hangul terms match as substrings since Korean glues particles onto words
/// ("퍼즐게임을"); ASCII terms must match a whole token.
pub fn contains_term(text: &str, tokens: &[String], term: &str) -> bool {
    if term.is_ascii() {
        tokens.iter().any(|t| t == term)
    } else {
        text.contains(term)
    }
}

/// Steam genres mentioned in `text`, deduplicated, in vocabulary order
pub fn genres_in(text: &str) -> Vec<&'static str> {
    let tokens = tokenize(text);
    let mut genres: Vec<&'static str> = Vec::new();
    for (term, genre) in GENRE_TERMS {
        if contains_term(text, &tokens, term) && !genres.contains(genre) {
            genres.push(*genre);
        }
    }
    genres
}

/// Does `text` ask for multiplayer games?
pub fn wants_multiplayer(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let tokens = tokenize(&lowered);
    MULTIPLAYER_TERMS
        .iter()
        .any(|term| contains_term(&lowered, &tokens, term))
}

/// Expand one query token into the English keywords it stands for.
///
/// Always includes the token itself (unless it is a stopword).
pub fn expand_token(token: &str) -> Vec<String> {
    let mut expanded = Vec::new();
    if !STOPWORDS.contains(&token) {
        expanded.push(token.to_string());
    }
    if !token.is_ascii() {
        for (term, genre) in GENRE_TERMS {
            if !term.is_ascii() && token.contains(term) {
                expanded.push(genre.to_lowercase());
            }
        }
        for (term, keywords) in KEYWORD_SYNONYMS {
            if token.contains(term) {
                expanded.extend(keywords.iter().map(|k| k.to_string()));
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_hyphenated_words() {
        assert_eq!(
            tokenize("Co-op Multi-player, PUZZLE!"),
            vec!["co-op", "multi-player", "puzzle"]
        );
        assert_eq!(tokenize("2만원 이하 퍼즐 게임"), vec!["2만원", "이하", "퍼즐", "게임"]);
    }

    #[test]
    fn test_genres_in_mixed_language() {
        assert_eq!(genres_in("2만원 이하 퍼즐 게임"), vec!["Puzzle"]);
        assert_eq!(genres_in("cheap action puzzle games"), vec!["Puzzle", "Action"]);
        assert_eq!(genres_in("액션게임이랑 모험"), vec!["Action", "Adventure"]);
        // "actionable" is not "action"
        assert!(genres_in("actionable advice").is_empty());
    }

    #[test]
    fn test_wants_multiplayer() {
        assert!(wants_multiplayer("커플이랑 할 게임"));
        assert!(wants_multiplayer("good Co-op shooters"));
        assert!(!wants_multiplayer("혼자 하는 퍼즐 게임"));
    }

    #[test]
    fn test_expand_token() {
        assert_eq!(expand_token("game"), Vec::<String>::new());
        let expanded = expand_token("힐링게임");
        assert!(expanded.contains(&"relaxing".to_string()));
        assert!(expanded.contains(&"힐링게임".to_string()));
        assert!(expand_token("퍼즐").contains(&"puzzle".to_string()));
    }
}
