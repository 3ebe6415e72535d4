use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "zettelclip",
    version,
    about = "Copy note paths and work with Zettelkasten IDs in a vault"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the vault directory
    #[clap(long, value_parser)]
    pub vault: Option<PathBuf>,

    /// Command that receives copied text on stdin
    #[clap(long)]
    pub clipboard_command: Option<String>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for zettelclip
    #[clap(subcommand)]
    pub command: Commands,
}
