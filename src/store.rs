//! Persisted state: the chosen birth instant and the theme preference.
//!
//! The birth instant is kept as an RFC 3339 string so it survives a round
//! trip unchanged; the file itself is small pretty-printed JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::theme::Theme;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

pub struct Store {
    path: PathBuf,
}

/// `<config dir>/lifeclock/state.json`, or the temp dir when there is none.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lifeclock")
        .join("state.json")
}

pub fn encode_birth<Tz: TimeZone>(birth: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    birth.to_rfc3339()
}

/// Read a stored instant back onto `tz`. Unreadable values are dropped.
pub fn decode_birth<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(instant) => Some(instant.with_timezone(tz)),
        Err(e) => {
            warn!(stored = raw, "ignoring unreadable birth instant: {e}");
            None
        }
    }
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file loads as empty state.
    pub async fn load(&self) -> Result<StoredState> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredState::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    pub async fn save(&self, state: &StoredState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub async fn load_birth<Tz: TimeZone>(&self, tz: &Tz) -> Result<Option<DateTime<Tz>>> {
        let state = self.load().await?;
        Ok(state.birth.as_deref().and_then(|raw| decode_birth(raw, tz)))
    }

    pub async fn set_birth<Tz: TimeZone>(&self, birth: &DateTime<Tz>) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut state = self.load().await?;
        state.birth = Some(encode_birth(birth));
        self.save(&state).await
    }

    pub async fn clear_birth(&self) -> Result<()> {
        let mut state = self.load().await?;
        state.birth = None;
        self.save(&state).await
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        let mut state = self.load().await?;
        state.theme = Some(theme);
        self.save(&state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn birth_round_trips_through_rfc3339() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let birth = tz.with_ymd_and_hms(1992, 6, 14, 7, 30, 0).unwrap();

        let raw = encode_birth(&birth);
        assert_eq!(raw, "1992-06-14T07:30:00+08:00");
        assert_eq!(decode_birth(&raw, &tz), Some(birth));
        assert_eq!(
            decode_birth(&raw, &Utc),
            Some(Utc.with_ymd_and_hms(1992, 6, 13, 23, 30, 0).unwrap())
        );
    }

    #[test]
    fn unreadable_birth_is_ignored() {
        assert_eq!(decode_birth("not a date", &Utc), None);
        assert_eq!(decode_birth("", &Utc), None);
    }

    #[tokio::test]
    async fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("state.json"));

        assert_eq!(store.load().await.unwrap(), StoredState::default());
        assert_eq!(store.load_birth(&Utc).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_and_clear_birth_keeps_theme() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("state.json"));
        let birth = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

        store.set_theme(Theme::Dark).await.unwrap();
        store.set_birth(&birth).await.unwrap();
        assert_eq!(store.load_birth(&Utc).await.unwrap(), Some(birth));

        store.clear_birth().await.unwrap();
        let state = store.load().await.unwrap();
        assert_eq!(state.birth, None);
        assert_eq!(state.theme, Some(Theme::Dark));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Store::new(path).load().await.is_err());
    }
}
