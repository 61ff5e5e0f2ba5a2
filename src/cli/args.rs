//! Command line argument parsing for the recordseek CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{RecordSeekError, Result};
use crate::highlight::HighlightMode;

/// recordseek - faceted, currency-aware search over business records
#[derive(Parser, Debug, Clone)]
#[command(name = "recordseek")]
#[command(about = "Faceted, currency-aware search over business records")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct RecordSeekArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl RecordSeekArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search a corpus and print grouped, ranked results with facets
    Search(SearchArgs),

    /// Print facet counts for a corpus, optionally narrowed by a query
    Facets(FacetsArgs),

    /// Highlight query matches in a piece of text
    Highlight(HighlightArgs),
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the corpus JSON file
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Facet selection, repeatable (e.g. entityType=Bill)
    #[arg(short, long = "select", value_name = "KEY=VALUE", value_parser = parse_selection)]
    pub selections: Vec<(String, String)>,

    /// Group results by entityType, project, status or client
    #[arg(short, long, value_name = "DIMENSION")]
    pub group_by: Option<String>,

    /// Search configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for facet counts
#[derive(Parser, Debug, Clone)]
pub struct FacetsArgs {
    /// Path to the corpus JSON file
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Optional query narrowing the counted records
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Facet selection, repeatable (e.g. project=Maple)
    #[arg(short, long = "select", value_name = "KEY=VALUE", value_parser = parse_selection)]
    pub selections: Vec<(String, String)>,

    /// Search configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for highlighting
#[derive(Parser, Debug, Clone)]
pub struct HighlightArgs {
    /// Text to highlight
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Highlight mode
    #[arg(short, long, default_value = "text")]
    pub mode: HighlightModeArg,
}

/// Highlight modes available in CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightModeArg {
    /// Plain-text term highlighting
    Text,
    /// Amount-aware highlighting
    Monetary,
}

impl From<HighlightModeArg> for HighlightMode {
    fn from(mode: HighlightModeArg) -> Self {
        match mode {
            HighlightModeArg::Text => HighlightMode::Text,
            HighlightModeArg::Monetary => HighlightMode::Monetary,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Parse a `key=value` facet selection.
pub fn parse_selection(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(RecordSeekError::invalid_argument(format!(
            "expected KEY=VALUE, got '{raw}'"
        ))),
    }
}
