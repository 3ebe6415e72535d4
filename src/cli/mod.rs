//! CLI module for zettelclip
//!
//! Hosts the plugin against a vault directory so every command can be run
//! from a terminal.
mod app;
mod main;

pub use app::*;
pub use main::*;
