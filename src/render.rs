//! Terminal presentation of the live loop's snapshots.

use std::io::{self, Write};

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::insights::InsightState;
use crate::panel::{self, Line};
use crate::session::{Frame, Snapshot};
use crate::theme::Theme;

const PROGRESS_BAR_CELLS: usize = 40;

/// Parse `#rrggbb`; anything else renders white.
fn rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(255)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

fn paint(text: &str, hex: &str) -> String {
    let (r, g, b) = rgb(hex);
    text.truecolor(r, g, b).to_string()
}

pub fn progress_bar(progress: f64, cells: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * cells as f64).round() as usize).min(cells);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(cells - filled))
}

/// One full redraw of the panel for `frame`.
pub fn render_frame(frame: &Frame, theme: Theme, insights: &InsightState) -> String {
    let colors = theme.colors();
    let (lines, _) = panel::frame_lines(frame, insights.items());

    let mut out = String::new();
    for line in &lines {
        match line {
            Line::Header(text) => out.push_str(&paint(text, colors.text)),
            Line::Blank => {}
            Line::Stat { key, dots, value } => {
                out.push_str(&paint(key, colors.key));
                out.push_str(&paint(dots, colors.cc));
                out.push_str(&paint(value, colors.value));
            }
            Line::Text(text) => out.push_str(&paint(&format!("  {text}"), colors.cc)),
            Line::Message(text) => {
                out.push_str(&paint(&format!("*** {text} ***"), colors.accent).bold().to_string())
            }
        }
        out.push('\n');

        // The sweep sits right under the year-progress row.
        if matches!(line, Line::Stat { key, .. } if key.starts_with("Year progress")) {
            out.push_str(&paint(
                &progress_bar(frame.progress, PROGRESS_BAR_CELLS),
                colors.accent,
            ));
            out.push('\n');
        }
    }

    if matches!(insights, InsightState::Pending) {
        out.push('\n');
        out.push_str(&paint("Fetching insights...", colors.cc));
        out.push('\n');
    }

    out
}

pub fn render_snapshot(snapshot: &Snapshot, theme: Theme, insights: &InsightState) -> String {
    match snapshot {
        Snapshot::Idle => paint("No birth date set.\n", theme.colors().cc),
        Snapshot::Running(frame) => render_frame(frame, theme, insights),
    }
}

/// A snapshot as one JSON line.
pub fn json_line(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Alternate-screen handling for watch mode.
pub struct Screen {
    alternate: bool,
}

impl Screen {
    pub fn new(alternate: bool) -> Self {
        Self { alternate }
    }

    pub fn enter(&self) -> Result<()> {
        if self.alternate {
            let mut stdout = io::stdout();
            write!(stdout, "\x1b[?1049h\x1b[?25l")?; // alternate screen, hide cursor
            stdout.flush()?;
        }
        Ok(())
    }

    pub fn leave(&self) -> Result<()> {
        if self.alternate {
            let mut stdout = io::stdout();
            write!(stdout, "\x1b[?25h\x1b[?1049l")?;
            stdout.flush()?;
        }
        Ok(())
    }

    /// Home the cursor, draw, and clear whatever the last frame left below.
    pub fn draw(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "\x1b[H{content}\x1b[J")?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::{AgeBreakdown, TotalUnits};

    fn frame(message: Option<&str>) -> Frame {
        Frame {
            age: AgeBreakdown {
                years: 1,
                ..AgeBreakdown::default()
            },
            progress: 0.5,
            totals: TotalUnits::default(),
            celebrate: message.is_some(),
            message: message.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(rgb("#06b6d4"), (0x06, 0xb6, 0xd4));
        assert_eq!(rgb("nope"), (255, 255, 255));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(7.0, 4), "[####]");
    }

    #[test]
    fn frame_contains_rows_bar_and_message() {
        let out = render_frame(
            &frame(Some("Happy birthday!")),
            Theme::Dark,
            &InsightState::NotRequested,
        );
        assert!(out.contains("Year progress"));
        assert!(out.contains("50.000000%"));
        assert!(out.contains(&progress_bar(0.5, PROGRESS_BAR_CELLS)));
        assert!(out.contains("Happy birthday!"));
    }

    #[test]
    fn pending_insights_are_announced() {
        let out = render_frame(&frame(None), Theme::Light, &InsightState::Pending);
        assert!(out.contains("Fetching insights"));

        let out = render_frame(
            &frame(None),
            Theme::Light,
            &InsightState::Failed {
                fallback: crate::insights::fallback(),
            },
        );
        assert!(out.contains("Journey Through Time"));
    }

    #[test]
    fn idle_snapshot_and_json() {
        let out = render_snapshot(&Snapshot::Idle, Theme::Dark, &InsightState::NotRequested);
        assert!(out.contains("No birth date set."));

        let line = json_line(&Snapshot::Running(frame(None))).unwrap();
        assert!(line.starts_with(r#"{"state":"running""#));
        assert!(!line.contains('\n'));
    }
}
