//! CLI interface using clap
//!
//! Provides the command-line interface for SCI Viewer

mod commands;

pub use commands::*;

use crate::render::ViewMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SCI Viewer - browse Standard Cleaning Instructions
#[derive(Parser, Debug)]
#[command(name = "sciviewer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Firestore web API key
    #[arg(long, global = true, env = "SCIVIEWER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui(TuiArgs),

    /// List sites with their SCI counts
    Sites,

    /// List the SCIs of a site
    List(ListArgs),

    /// Render a single SCI
    Show(ShowArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for TUI command
#[derive(Parser, Debug, Default)]
pub struct TuiArgs {
    /// Presentation mode of the detail view
    #[arg(short, long)]
    pub mode: Option<ViewMode>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Site identifier
    #[arg(short, long)]
    pub site: String,

    /// Case-insensitive title filter
    #[arg(short = 'q', long)]
    pub search: Option<String>,
}

/// Arguments for show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// SCI document identifier
    pub doc_id: String,

    /// Site identifier
    #[arg(short, long)]
    pub site: String,

    /// Presentation mode
    #[arg(short, long)]
    pub mode: Option<ViewMode>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Print the configuration file path
    #[arg(long)]
    pub path: bool,

    /// Write the current configuration to the file
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand to run; the TUI when none is given
    pub fn command(&self) -> &Commands {
        static DEFAULT: Commands = Commands::Tui(TuiArgs { mode: None });
        self.command.as_ref().unwrap_or(&DEFAULT)
    }

    /// Whether the terminal UI will take over the screen
    pub fn is_tui(&self) -> bool {
        matches!(self.command(), Commands::Tui(_))
    }
}
