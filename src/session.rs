//! Canonical state of one live session.
//!
//! A session is either idle (no birth instant) or running. Every tick turns
//! the sampled instant into a [`Frame`] and runs the birthday edge detector:
//! the first tick at or after the birthday's time of day fires `celebrate`
//! once, and the flag re-arms only after the calendar day stops matching.
//! The day of birth itself is not an anniversary and never fires.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::age::{self, AgeBreakdown, TotalUnits};

/// Everything the presentation layer needs for one redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub age: AgeBreakdown,
    pub progress: f64,
    pub totals: TotalUnits,
    /// True only on the tick that crossed into the birthday.
    pub celebrate: bool,
    /// Celebration text, cleared by the loop's message timer.
    pub message: Option<String>,
}

/// Published state of the live loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Snapshot {
    #[default]
    Idle,
    Running(Frame),
}

impl Snapshot {
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Snapshot::Idle => None,
            Snapshot::Running(frame) => Some(frame),
        }
    }
}

pub struct Session<Tz: TimeZone> {
    birth: Option<DateTime<Tz>>,
    celebrated: bool,
    message: Option<String>,
}

impl<Tz: TimeZone> Default for Session<Tz> {
    fn default() -> Self {
        Self {
            birth: None,
            celebrated: false,
            message: None,
        }
    }
}

impl<Tz: TimeZone> Session<Tz> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter (or restart) the running state with a new birth instant.
    pub fn start(&mut self, birth: DateTime<Tz>) {
        self.birth = Some(birth);
        self.celebrated = false;
        self.message = None;
    }

    /// Back to idle; all derived state is dropped.
    pub fn reset(&mut self) {
        self.birth = None;
        self.celebrated = false;
        self.message = None;
    }

    pub fn is_running(&self) -> bool {
        self.birth.is_some()
    }

    pub fn birth(&self) -> Option<&DateTime<Tz>> {
        self.birth.as_ref()
    }

    pub fn has_celebrated(&self) -> bool {
        self.celebrated
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Recompute everything for `now`. Pure arithmetic, never blocks.
    pub fn tick(&mut self, now: &DateTime<Tz>) -> Snapshot {
        let Some(birth) = self.birth.as_ref() else {
            return Snapshot::Idle;
        };

        let age = age::age_breakdown(birth, now);
        let progress = age::year_progress(birth, now);
        let totals = age::total_units(birth, now);
        let on_date = age::is_anniversary_date_today(birth, now);
        let birthday_now = age.years >= 1 && age::is_birthday_now(birth, now);

        if !on_date {
            self.celebrated = false;
        }

        let celebrate = birthday_now && !self.celebrated;
        if celebrate {
            self.celebrated = true;
            self.message = Some(celebration_message(age.years));
        }

        Snapshot::Running(Frame {
            age,
            progress,
            totals,
            celebrate,
            message: self.message.clone(),
        })
    }
}

pub fn celebration_message(years: u32) -> String {
    format!("Happy birthday! {years} trips around the sun today.")
}
