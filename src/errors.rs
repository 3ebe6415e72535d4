//! Error types for the zettelclip plugin.
//!
//! This module defines the error types that categorize the failures a single
//! command or event can run into. None of them are fatal to the plugin itself.

use std::io;

use thiserror::Error;

/// The main error type for zettelclip.
#[derive(Error, Debug)]
pub enum ZettelError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors raised by the vault file watcher.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// A command needed a focused document but none exists.
    #[error("No active file")]
    NoActiveFile,

    /// The filename does not start with a 12-digit Zettelkasten identifier.
    #[error("No valid Zettelkasten ID found in filename: {name}")]
    MalformedIdentifier { name: String },

    /// The clipboard capability rejected the write.
    #[error("Clipboard write failed: {message}")]
    ClipboardFailed { message: String },

    /// The document is not known to the workspace.
    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
