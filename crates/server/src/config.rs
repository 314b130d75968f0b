//! Assistant configuration.
//!
//! Every setting has a default and can be overridden through a
//! `GAME_RECS_*` environment variable. The API key itself is read from the
//! variable named by `GAME_RECS_API_KEY_ENV` (default `ANTHROPIC_API_KEY`).

use crate::error::ConfigError;
use llm_client::anthropic::DEFAULT_BASE_URL;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PLANNER_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_WORKER_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_SYNTHESIZER_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_WEB_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_KRW_PER_USD: f64 = 1300.0;

/// How the workers named in a plan are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// All at once, results collected before synthesis
    #[default]
    Concurrent,
    /// One after another in plan order
    Sequential,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" | "parallel" => Ok(DispatchMode::Concurrent),
            "sequential" | "serial" => Ok(DispatchMode::Sequential),
            other => Err(format!(
                "unknown dispatch mode '{}' (expected concurrent or sequential)",
                other
            )),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Concurrent => write!(f, "concurrent"),
            DispatchMode::Sequential => write!(f, "sequential"),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct AssistantConfig {
    pub planner_model: String,
    pub worker_model: String,
    pub synthesizer_model: String,
    pub llm_base_url: String,
    pub api_key_env: String,
    /// Resolved from `api_key_env`; never printed
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub worker_timeout: Duration,
    pub dispatch_mode: DispatchMode,
    pub krw_per_usd: f64,
    pub retrieval_limit: usize,
    pub filter_limit: usize,
    pub web_search_url: String,
    pub web_max_chars: usize,
    /// Idle sessions older than this are evicted; `None` keeps them forever
    pub session_ttl: Option<Duration>,
    pub max_turns: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            planner_model: DEFAULT_PLANNER_MODEL.to_string(),
            worker_model: DEFAULT_WORKER_MODEL.to_string(),
            synthesizer_model: DEFAULT_SYNTHESIZER_MODEL.to_string(),
            llm_base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            max_tokens: 1024,
            temperature: 0.2,
            worker_timeout: Duration::from_secs(30),
            dispatch_mode: DispatchMode::Concurrent,
            krw_per_usd: DEFAULT_KRW_PER_USD,
            retrieval_limit: 20,
            filter_limit: 10,
            web_search_url: DEFAULT_WEB_SEARCH_URL.to_string(),
            web_max_chars: 4000,
            session_ttl: None,
            max_turns: 10,
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("planner_model", &self.planner_model)
            .field("worker_model", &self.worker_model)
            .field("synthesizer_model", &self.synthesizer_model)
            .field("llm_base_url", &self.llm_base_url)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("worker_timeout", &self.worker_timeout)
            .field("dispatch_mode", &self.dispatch_mode)
            .field("krw_per_usd", &self.krw_per_usd)
            .field("retrieval_limit", &self.retrieval_limit)
            .field("filter_limit", &self.filter_limit)
            .field("web_search_url", &self.web_search_url)
            .field("web_max_chars", &self.web_max_chars)
            .field("session_ttl", &self.session_ttl)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Parse `key` with `FromStr` when it is set, else keep `default`
fn parsed<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, e.to_string())),
        None => Ok(default),
    }
}

fn positive<T: PartialOrd + Default + Copy>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: fmt::Display,
{
    if value > T::default() {
        Ok(value)
    } else {
        Err(invalid(key, &value.to_string(), "must be greater than zero"))
    }
}

impl AssistantConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key -> value source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let text = |key: &str, default: String| lookup(key).unwrap_or(default);

        let api_key_env = text("GAME_RECS_API_KEY_ENV", defaults.api_key_env);
        let api_key = lookup(&api_key_env);

        let temperature: f32 = parsed(&lookup, "GAME_RECS_TEMPERATURE", defaults.temperature)?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(invalid(
                "GAME_RECS_TEMPERATURE",
                &temperature.to_string(),
                "must be between 0 and 1",
            ));
        }

        let krw_per_usd: f64 = parsed(&lookup, "GAME_RECS_KRW_PER_USD", defaults.krw_per_usd)?;
        if !krw_per_usd.is_finite() {
            return Err(invalid(
                "GAME_RECS_KRW_PER_USD",
                &krw_per_usd.to_string(),
                "must be a finite number",
            ));
        }

        let timeout_secs: u64 = parsed(
            &lookup,
            "GAME_RECS_WORKER_TIMEOUT_SECS",
            defaults.worker_timeout.as_secs(),
        )?;

        let session_ttl = match lookup("GAME_RECS_SESSION_TTL_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        invalid("GAME_RECS_SESSION_TTL_SECS", &raw, e.to_string())
                    })?;
                Some(Duration::from_secs(positive("GAME_RECS_SESSION_TTL_SECS", secs)?))
            }
            None => None,
        };

        Ok(Self {
            planner_model: text("GAME_RECS_PLANNER_MODEL", defaults.planner_model),
            worker_model: text("GAME_RECS_WORKER_MODEL", defaults.worker_model),
            synthesizer_model: text("GAME_RECS_SYNTHESIZER_MODEL", defaults.synthesizer_model),
            llm_base_url: text("GAME_RECS_LLM_BASE_URL", defaults.llm_base_url),
            api_key_env,
            api_key,
            max_tokens: positive(
                "GAME_RECS_MAX_TOKENS",
                parsed(&lookup, "GAME_RECS_MAX_TOKENS", defaults.max_tokens)?,
            )?,
            temperature,
            worker_timeout: Duration::from_secs(positive(
                "GAME_RECS_WORKER_TIMEOUT_SECS",
                timeout_secs,
            )?),
            dispatch_mode: parsed(&lookup, "GAME_RECS_DISPATCH_MODE", defaults.dispatch_mode)?,
            krw_per_usd: positive("GAME_RECS_KRW_PER_USD", krw_per_usd)?,
            retrieval_limit: positive(
                "GAME_RECS_RETRIEVAL_LIMIT",
                parsed(&lookup, "GAME_RECS_RETRIEVAL_LIMIT", defaults.retrieval_limit)?,
            )?,
            filter_limit: positive(
                "GAME_RECS_FILTER_LIMIT",
                parsed(&lookup, "GAME_RECS_FILTER_LIMIT", defaults.filter_limit)?,
            )?,
            web_search_url: text("GAME_RECS_WEB_SEARCH_URL", defaults.web_search_url),
            web_max_chars: positive(
                "GAME_RECS_WEB_MAX_CHARS",
                parsed(&lookup, "GAME_RECS_WEB_MAX_CHARS", defaults.web_max_chars)?,
            )?,
            session_ttl,
            max_turns: parsed(&lookup, "GAME_RECS_MAX_TURNS", defaults.max_turns)?,
        })
    }

    /// The API key, or an error naming the variable that should hold it
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::Missing(self.api_key_env.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AssistantConfig::default());
        assert_eq!(config.worker_timeout, Duration::from_secs(30));
        assert_eq!(config.dispatch_mode, DispatchMode::Concurrent);
        assert_eq!(config.krw_per_usd, 1300.0);
        assert!(config.session_ttl.is_none());
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::Missing(name)) if name == "ANTHROPIC_API_KEY"
        ));
    }

    #[test]
    fn test_overrides() {
        let config = AssistantConfig::from_lookup(lookup_from(&[
            ("GAME_RECS_API_KEY_ENV", "MY_KEY"),
            ("MY_KEY", "sk-test"),
            ("GAME_RECS_DISPATCH_MODE", "Sequential"),
            ("GAME_RECS_WORKER_TIMEOUT_SECS", "5"),
            ("GAME_RECS_KRW_PER_USD", "1400.5"),
            ("GAME_RECS_SESSION_TTL_SECS", "600"),
            ("GAME_RECS_PLANNER_MODEL", "planner-x"),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.dispatch_mode, DispatchMode::Sequential);
        assert_eq!(config.worker_timeout, Duration::from_secs(5));
        assert_eq!(config.krw_per_usd, 1400.5);
        assert_eq!(config.session_ttl, Some(Duration::from_secs(600)));
        assert_eq!(config.planner_model, "planner-x");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config =
            AssistantConfig::from_lookup(lookup_from(&[("GAME_RECS_WORKER_MODEL", "  ")])).unwrap();
        assert_eq!(config.worker_model, DEFAULT_WORKER_MODEL);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("GAME_RECS_WORKER_TIMEOUT_SECS", "soon"),
            ("GAME_RECS_WORKER_TIMEOUT_SECS", "0"),
            ("GAME_RECS_KRW_PER_USD", "-1"),
            ("GAME_RECS_KRW_PER_USD", "NaN"),
            ("GAME_RECS_DISPATCH_MODE", "random"),
            ("GAME_RECS_TEMPERATURE", "3"),
            ("GAME_RECS_SESSION_TTL_SECS", "0"),
        ] {
            let result = AssistantConfig::from_lookup(lookup_from(&[(key, value)]));
            assert!(
                matches!(&result, Err(ConfigError::InvalidValue { key: k, .. }) if k == key),
                "{}={} should be rejected, got {:?}",
                key,
                value,
                result
            );
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config =
            AssistantConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-secret")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("[redacted]"));
    }

    #[test]
    fn test_dispatch_mode_round_trip() {
        for mode in [DispatchMode::Concurrent, DispatchMode::Sequential] {
            assert_eq!(mode.to_string().parse::<DispatchMode>().unwrap(), mode);
        }
    }
}
