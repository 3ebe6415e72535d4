//! Note path copying and Zettelkasten ID plugin library
//!
//! This library provides the plugin core (path formatting, Zettelkasten
//! identifier parsing, note age rendering) behind narrow host capability
//! traits, plus filesystem and terminal backends used by the CLI.

mod cli;
mod config;
mod distance;
mod errors;
mod fs_host;
mod host;
mod memory_host;
mod path_format;
mod plugin;
mod settings;
mod types;
mod watcher;
mod zettel;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use distance::*;
pub use errors::*;
pub use fs_host::*;
pub use host::*;
pub use memory_host::*;
pub use path_format::*;
pub use plugin::*;
pub use settings::*;
pub use types::*;
pub use watcher::*;
pub use zettel::*;
