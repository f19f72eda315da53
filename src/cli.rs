//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::theme::Theme;

/// Live age clock, precise to the second
#[derive(Parser)]
#[command(name = "lifeclock")]
#[command(about = "Live age clock, precise to the second", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Colour theme (overrides the stored preference and the terminal's)
    #[arg(long, global = true, value_enum)]
    pub theme: Option<Theme>,

    /// Sampling cadence in milliseconds (overrides LIFECLOCK_TICK_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: Option<u64>,

    /// Subcommand (if not provided, watches the stored birth date)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the birth date and time, then start watching
    Start {
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Birth time, HH:MM or HH:MM:SS
        #[arg(long, default_value = "00:00")]
        time: String,

        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Watch the stored birth date live
    Watch {
        #[command(flatten)]
        watch: WatchArgs,
    },

    /// Forget the stored birth date
    Reset,

    /// Ask for descriptive insights about the stored birth date
    Insights,

    /// Write dark and light SVG cards for the current instant
    Snapshot {
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Store a theme preference
    Theme {
        #[arg(value_enum)]
        choice: ThemeChoice,
    },
}

#[derive(clap::Args, Default, Clone, Copy)]
pub struct WatchArgs {
    /// Emit every frame as a JSON line instead of drawing the panel
    #[arg(long)]
    pub json: bool,

    /// Fetch insights in the background and show them under the panel
    #[arg(long)]
    pub insights: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}
