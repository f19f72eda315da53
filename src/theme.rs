//! Colour themes and how the active one is chosen.
//!
//! The choice walks an ordered list of lookups and takes the first answer:
//! an explicit flag, then the stored preference, then the terminal's own
//! background, and finally light.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub accent: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#000000",
                text: "#e2e8f0",
                key: "#94a3b8",
                value: "#60a5fa",
                cc: "#475569",
                accent: "#06b6d4",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#1e293b",
                key: "#64748b",
                value: "#2563eb",
                cc: "#94a3b8",
                accent: "#0891b2",
            },
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme `{other}`")),
        }
    }
}

/// One step of the theme precedence chain.
pub trait ThemeLookup {
    fn lookup(&self) -> Option<Theme>;
}

/// A theme named on the command line.
pub struct Explicit(pub Option<Theme>);

impl ThemeLookup for Explicit {
    fn lookup(&self) -> Option<Theme> {
        self.0
    }
}

/// The preference saved by an earlier toggle.
pub struct Stored(pub Option<Theme>);

impl ThemeLookup for Stored {
    fn lookup(&self) -> Option<Theme> {
        self.0
    }
}

/// The terminal's background, read from `COLORFGBG` ("fg;bg", where
/// backgrounds 0-6 and 8 are dark).
pub struct SystemPreference {
    pub colorfgbg: Option<String>,
}

impl SystemPreference {
    pub fn from_env() -> Self {
        Self {
            colorfgbg: std::env::var("COLORFGBG").ok(),
        }
    }
}

impl ThemeLookup for SystemPreference {
    fn lookup(&self) -> Option<Theme> {
        let raw = self.colorfgbg.as_deref()?;
        let bg: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
        match bg {
            0..=6 | 8 => Some(Theme::Dark),
            _ => Some(Theme::Light),
        }
    }
}

/// First lookup with an answer wins; light when none has one.
pub fn resolve(chain: &[&dyn ThemeLookup]) -> Theme {
    chain
        .iter()
        .find_map(|step| step.lookup())
        .unwrap_or(Theme::Light)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(raw: &str) -> SystemPreference {
        SystemPreference {
            colorfgbg: Some(raw.to_owned()),
        }
    }

    #[test]
    fn explicit_beats_everything() {
        let theme = resolve(&[
            &Explicit(Some(Theme::Light)),
            &Stored(Some(Theme::Dark)),
            &system("15;0"),
        ]);
        assert_eq!(theme, Theme::Light);
    }

    #[test]
    fn stored_beats_system() {
        let theme = resolve(&[&Explicit(None), &Stored(Some(Theme::Light)), &system("15;0")]);
        assert_eq!(theme, Theme::Light);
    }

    #[test]
    fn system_background_decides_when_nothing_else_does() {
        assert_eq!(resolve(&[&Explicit(None), &Stored(None), &system("15;0")]), Theme::Dark);
        assert_eq!(resolve(&[&Explicit(None), &Stored(None), &system("0;15")]), Theme::Light);
        assert_eq!(resolve(&[&system("15;default;0")]), Theme::Dark);
    }

    #[test]
    fn defaults_to_light() {
        assert_eq!(resolve(&[]), Theme::Light);
        assert_eq!(resolve(&[&system("garbage")]), Theme::Light);
        assert_eq!(
            resolve(&[&SystemPreference { colorfgbg: None }]),
            Theme::Light
        );
    }

    #[test]
    fn parses_and_toggles() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.to_string(), "light");
    }
}
