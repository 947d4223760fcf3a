use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shortcut-manager")]
#[command(about = "Inspect and edit keyboard shortcut preferences")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// Config file (defaults to ~/.config/shortcut-manager/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Action definitions XML, overriding the config
    #[arg(long, global = true)]
    pub actions: Option<PathBuf>,

    /// JSON preferences file, overriding the config
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Directory for the JSONL log file
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Use the Mac modifier vocabulary and glyphs
    #[arg(long, global = true, conflicts_with = "pc")]
    pub mac: bool,

    /// Use the PC modifier vocabulary and labels
    #[arg(long, global = true)]
    pub pc: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show every action with its current and default shortcut
    List,
    /// Bind a shortcut written in the external vocabulary
    Set {
        /// Action identifier, e.g. SeekAction-FORWARD
        id: String,
        /// Modifier name (shift, ctrl, alt, meta, menu, command)
        #[arg(long = "mask")]
        masks: Vec<String>,
        /// Key name (qualifier or virtual-key name)
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
    },
    /// Remove the shortcut of an action
    Clear {
        /// Action identifier
        id: String,
    },
    /// Put every action back on its default shortcut
    Reset,
    /// Print the display form of an internal form
    Render {
        /// Internal form tokens, e.g. `ctrl shift S`
        #[arg(required = true, num_args = 1..)]
        form: Vec<String>,
    },
}
