//! Command-line interface for pressurelog.
//!
//! This module provides the CLI structure for the `bplog` binary and the
//! interactive form.

mod commands;
pub mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ListCommand, MedicationArg, OutputFormat,
    ThemeCommand,
};

/// bplog - Keep a blood pressure log in your terminal
///
/// Records systolic/diastolic/pulse readings with medication status and
/// notes, newest first, classified into severity bands.
#[derive(Debug, Parser)]
#[command(name = "bplog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a reading
    Add(AddCommand),

    /// Show all readings, newest first
    List(ListCommand),

    /// Delete a reading by id
    Delete(DeleteCommand),

    /// Show or toggle the light/dark theme
    Theme {
        /// Theme action (defaults to show)
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },

    /// Open the interactive form
    Form,

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
