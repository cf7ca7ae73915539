//! Command-line surface: argument parsing, command handlers and the TUI

pub mod app;
pub mod commands;
pub mod tui;

pub use app::{Cli, Commands, LogLevel};
