//! Live age clock.
//!
//! [`age`] is the pure calculator; [`session`] and [`live`] turn it into a
//! ticking, celebrating loop; the remaining modules are the boundaries
//! around it (input, persistence, theme, insights, rendering, CLI).

pub mod age;
pub mod cli;
pub mod clock;
pub mod config;
pub mod input;
pub mod insights;
pub mod live;
pub mod panel;
pub mod render;
pub mod session;
pub mod store;
pub mod svg;
pub mod theme;
