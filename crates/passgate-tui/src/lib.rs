//! Passgate TUI Library
//!
//! Terminal host for passgate-core: renders the lock screen, drives the
//! unlock session from the event loop and maps terminal focus changes onto
//! application lifecycle events.

pub mod app;
pub mod auth;
pub mod ui;

pub use app::{App, TuiConfig};
