//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    color::ColorCommands, completions::CompletionsArgs, config::ConfigCommands, init::InitArgs,
    paint::PaintCommands,
};

#[derive(Parser)]
#[command(name = "botes")]
#[command(author, version, about = "Paint can inventory")]
#[command(long_about = "Paint can inventory.\n\nKeep track of paint cans: what is left in each one, whether it was mixed with water, and which color its code stands for.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .botes/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new botes project
    Init(InitArgs),

    /// Paint can management
    #[command(subcommand)]
    Paint(PaintCommands),

    /// Code to color table
    #[command(subcommand)]
    Color(ColorCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (detail view for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
    /// Just short references (@N), one per line
    ShortId,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default, then the command's own default
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|s| OutputFormat::from_str(s, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}
