//! Runtime configuration.
//!
//! Everything is read from environment variables, with command line flags
//! applied on top by the binary.

use std::path::PathBuf;
use std::time::Duration;

use crate::live::DEFAULT_TICK;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Sampling cadence of the live loop.
    pub tick: Duration,
    /// Where the birth instant and theme preference are kept.
    pub state_file: PathBuf,
    pub insights: InsightsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsConfig {
    /// Absent key means every request falls back immediately.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// - `LIFECLOCK_TICK_MS` -- sampling cadence in milliseconds (default 50)
    /// - `LIFECLOCK_STATE_FILE` -- state file path (default under the user config dir)
    /// - `GEMINI_API_KEY` or `API_KEY` -- credential for insights
    /// - `GEMINI_API_URL` -- API base URL
    /// - `GEMINI_MODEL` -- model name
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tick = match lookup("LIFECLOCK_TICK_MS") {
            Some(raw) => tick_from_millis(&raw)?,
            None => DEFAULT_TICK,
        };

        let state_file = lookup("LIFECLOCK_STATE_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(crate::store::default_path);

        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            tick,
            state_file,
            insights: InsightsConfig {
                api_key,
                api_url: lookup("GEMINI_API_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_owned()),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned()),
            },
        })
    }
}

/// Parse a tick cadence; zero is rejected since it would spin the loop.
pub fn tick_from_millis(raw: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
        name: "LIFECLOCK_TICK_MS",
        reason: format!("{e}"),
    })?;
    if ms == 0 {
        return Err(ConfigError::Invalid {
            name: "LIFECLOCK_TICK_MS",
            reason: "must be at least 1".to_owned(),
        });
    }
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.tick, Duration::from_millis(50));
        assert_eq!(config.insights.api_key, None);
        assert_eq!(config.insights.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.insights.api_url, DEFAULT_GEMINI_API_URL);
        assert!(config.state_file.ends_with("state.json"));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("LIFECLOCK_TICK_MS", "250"),
            ("LIFECLOCK_STATE_FILE", "/tmp/lc.json"),
            ("API_KEY", "legacy"),
            ("GEMINI_MODEL", "gemini-test"),
        ]))
        .unwrap();

        assert_eq!(config.tick, Duration::from_millis(250));
        assert_eq!(config.state_file, PathBuf::from("/tmp/lc.json"));
        assert_eq!(config.insights.api_key.as_deref(), Some("legacy"));
        assert_eq!(config.insights.model, "gemini-test");
    }

    #[test]
    fn gemini_key_wins_over_legacy_key() {
        let config =
            Config::from_lookup(lookup(&[("API_KEY", "legacy"), ("GEMINI_API_KEY", "new")]))
                .unwrap();
        assert_eq!(config.insights.api_key.as_deref(), Some("new"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert_eq!(config.insights.api_key, None);
    }

    #[test]
    fn rejects_bad_tick() {
        assert!(Config::from_lookup(lookup(&[("LIFECLOCK_TICK_MS", "fast")])).is_err());
        assert_eq!(
            tick_from_millis("0"),
            Err(ConfigError::Invalid {
                name: "LIFECLOCK_TICK_MS",
                reason: "must be at least 1".to_owned(),
            })
        );
    }
}
