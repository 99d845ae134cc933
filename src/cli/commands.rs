//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Walk paginated JSON APIs as one sequence of records
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Walk definition file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a source and print one JSON record per line
    Fetch(FetchArgs),

    /// Validate a walk definition file
    Validate,
}

/// Options for `fetch`; each one overrides the walk file
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Endpoint URL
    #[arg(long)]
    pub url: Option<String>,

    /// Records requested per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Maximum batches before giving up
    #[arg(long)]
    pub times_limit: Option<usize>,

    /// Query parameter carrying the page number
    #[arg(long)]
    pub page_param: Option<String>,

    /// Query parameter carrying the batch size
    #[arg(long)]
    pub limit_param: Option<String>,

    /// Query parameter carrying the record offset
    #[arg(long)]
    pub offset_param: Option<String>,

    /// Dot path to the records array
    #[arg(long)]
    pub records_path: Option<String>,

    /// Dot path to the total record count
    #[arg(long)]
    pub total_path: Option<String>,

    /// Keyset parameter naming the last key seen (requires --key-field)
    #[arg(long, requires = "key_field")]
    pub after_param: Option<String>,

    /// Record field holding the key (requires --after-param)
    #[arg(long, requires = "after_param")]
    pub key_field: Option<String>,

    /// Extra request header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Stop after this many records
    #[arg(long)]
    pub max_records: Option<usize>,
}
