//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::form::FormFields;
use crate::record::MedicationStatus;

/// Add command arguments.
///
/// The numeric values are taken as text so the form can report blank or
/// out-of-range input the same way the interactive form does.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Systolic pressure (0-300)
    #[arg(short, long, allow_hyphen_values = true)]
    pub systolic: Option<String>,

    /// Diastolic pressure (0-200)
    #[arg(short, long, allow_hyphen_values = true)]
    pub diastolic: Option<String>,

    /// Pulse in beats per minute (0-300)
    #[arg(short, long, allow_hyphen_values = true)]
    pub pulse: Option<String>,

    /// Medication status
    #[arg(short, long, value_enum, default_value = "none")]
    pub medication: MedicationArg,

    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl AddCommand {
    /// The form input these arguments describe.
    #[must_use]
    pub fn to_fields(&self) -> FormFields {
        FormFields {
            systolic: self.systolic.clone().unwrap_or_default(),
            diastolic: self.diastolic.clone().unwrap_or_default(),
            pulse: self.pulse.clone().unwrap_or_default(),
            medication: MedicationStatus::from(self.medication).as_value().to_string(),
            notes: self.notes.clone().unwrap_or_default(),
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the record, as shown on its card
    pub id: i64,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Theme commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Subcommand)]
pub enum ThemeCommand {
    /// Show the current theme
    #[default]
    Show,

    /// Switch between light and dark
    Toggle,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Medication status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MedicationArg {
    /// Medication taken (已服藥)
    Taken,
    /// Medication not taken (未服藥)
    NotTaken,
    /// Not specified (無)
    None,
}

impl From<MedicationArg> for MedicationStatus {
    fn from(arg: MedicationArg) -> Self {
        match arg {
            MedicationArg::Taken => Self::Taken,
            MedicationArg::NotTaken => Self::NotTaken,
            MedicationArg::None => Self::Unspecified,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text cards
    #[default]
    Plain,
    /// JSON card models
    Json,
}
