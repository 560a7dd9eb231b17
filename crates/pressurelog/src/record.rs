//! Core record types for pressurelog.
//!
//! A [`Record`] is one blood-pressure reading as it is persisted. Records are
//! immutable once created; the only way to change the log is to add or
//! delete whole records.

use serde::{Deserialize, Serialize};

/// Medication value meaning "taken".
pub const MEDICATION_TAKEN: &str = "已服藥";

/// Medication value meaning "not taken".
pub const MEDICATION_NOT_TAKEN: &str = "未服藥";

/// Medication value meaning "not specified"; the form's default.
pub const MEDICATION_UNSPECIFIED: &str = "無";

/// A single blood-pressure reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Creation time in Unix milliseconds; the sole key for deletion.
    pub id: i64,

    /// Localized creation time, captured when the record was made.
    pub datetime: String,

    /// Systolic pressure in mmHg.
    pub systolic: i64,

    /// Diastolic pressure in mmHg.
    pub diastolic: i64,

    /// Pulse in beats per minute.
    pub pulse: i64,

    /// Medication status as entered; see [`MedicationStatus`].
    pub medication: String,

    /// Free-form notes, possibly empty.
    #[serde(default)]
    pub notes: String,
}

impl Record {
    /// Classify the free-form medication string.
    #[must_use]
    pub fn medication_status(&self) -> MedicationStatus {
        MedicationStatus::from_value(&self.medication)
    }

    /// Whether the record carries any notes.
    #[must_use]
    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// Typed view of a record's medication string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MedicationStatus {
    /// Medication was taken before the reading.
    Taken,
    /// Medication was not taken.
    NotTaken,
    /// Anything else, including the `無` default.
    Unspecified,
}

impl MedicationStatus {
    /// Classify a stored medication value. Only the two exact strings are
    /// recognized.
    #[must_use]
    pub fn from_value(value: &str) -> Self {
        match value {
            MEDICATION_TAKEN => Self::Taken,
            MEDICATION_NOT_TAKEN => Self::NotTaken,
            _ => Self::Unspecified,
        }
    }

    /// The canonical stored value for this status.
    #[must_use]
    pub fn as_value(self) -> &'static str {
        match self {
            Self::Taken => MEDICATION_TAKEN,
            Self::NotTaken => MEDICATION_NOT_TAKEN,
            Self::Unspecified => MEDICATION_UNSPECIFIED,
        }
    }
}
