//! `pressurelog` - A personal blood pressure log
//!
//! This library provides the record store, input form, severity rendering
//! and theme handling behind the `bplog` terminal app. All state lives in a
//! local key-value store on disk.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod record;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;
pub mod theme;
pub mod timestamp;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormController, FormFields, ValidationError};
pub use logging::init_logging;
pub use record::{MedicationStatus, Record};
pub use render::{render_all, Card, Category, Level, ListView};
pub use session::{DeleteOutcome, Session};
pub use storage::LocalStorage;
pub use store::RecordStore;
pub use theme::{Theme, ThemeController};
