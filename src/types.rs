//! Shared types for zettelclip: the result alias and the CLI subcommands.
use std::path::PathBuf;

use clap::Subcommand;

use crate::ZettelError;

/// A specialized Result type for zettelclip operations.
pub type Result<T> = std::result::Result<T, ZettelError>;

/// Available subcommands. Commands taking a `file` treat it as the active
/// document; it may be absolute or relative to the vault.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy the full path of a note to the clipboard
    CopyPath {
        /// The note
        file: PathBuf,
    },

    /// Copy the vault-relative path of a note to the clipboard
    CopyRelativePath {
        /// The note
        file: PathBuf,
    },

    /// Show the date encoded in a note's Zettelkasten ID and its age
    NoteDate {
        /// The note
        file: PathBuf,
    },

    /// Append a fresh Zettelkasten ID to a note
    AppendId {
        /// The note
        file: PathBuf,
    },

    /// Run a plugin command by id (see `commands`)
    Run {
        /// Command id, e.g. `append-zettelkasten-id`
        command: String,

        /// The note to focus before running the command
        file: Option<PathBuf>,
    },

    /// List plugin commands and the ribbon shortcut
    Commands,

    /// Print the status bar text for a note
    Status {
        /// The note
        file: PathBuf,
    },

    /// Show the file context menu for a note, optionally clicking an entry
    Menu {
        /// The note
        file: PathBuf,

        /// 1-based index of the entry to run
        #[clap(short, long)]
        pick: Option<usize>,
    },

    /// Watch the vault and keep the note age status current
    Watch,

    /// Show or change plugin settings
    Settings {
        /// New value for the setting
        #[clap(short, long)]
        set: Option<String>,
    },

    /// Print a Zettelkasten ID for the current time
    NewId,
}
