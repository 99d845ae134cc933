//! CLI module
//!
//! Command-line interface for walking HTTP sources.
//!
//! # Commands
//!
//! - `fetch` - Walk a source and print its records as JSON lines
//! - `validate` - Check a walk definition file

mod commands;
mod runner;

pub use commands::{Cli, Commands, FetchArgs};
pub use runner::Runner;
