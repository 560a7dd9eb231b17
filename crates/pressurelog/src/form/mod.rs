//! The record form.
//!
//! [`FormController`] holds the raw text of the form fields, validates a
//! submission, turns it into a [`Record`] and hands it to the
//! [`RecordStore`]. Nothing is stored unless every check passes.

mod dispatch;

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

pub use dispatch::{FieldId, FormKey, KeyOutcome};

use crate::error::Result;
use crate::record::{Record, MEDICATION_UNSPECIFIED};
use crate::storage::LocalStorage;
use crate::store::RecordStore;
use crate::timestamp::{Clock, DateLocale};

/// Message shown after a record has been added.
pub const SUCCESS_MESSAGE: &str = "血壓紀錄已成功新增！";

/// Accepted systolic range, inclusive.
pub const SYSTOLIC_RANGE: (i64, i64) = (0, 300);

/// Accepted diastolic range, inclusive.
pub const DIASTOLIC_RANGE: (i64, i64) = (0, 200);

/// Accepted pulse range, inclusive.
pub const PULSE_RANGE: (i64, i64) = (0, 300);

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Systolic, diastolic or pulse was left empty.
    #[error("請填寫收縮壓、舒張壓和脈搏！ (missing: {})", join_fields(.fields))]
    MissingRequiredField {
        /// The empty fields, in form order.
        fields: Vec<FieldId>,
    },

    /// A numeric field was outside its accepted range or not a number.
    #[error("請輸入有效的數值範圍！ ({field} = {value:?}, expected {min}..={max})")]
    OutOfRange {
        /// The offending field.
        field: FieldId,
        /// The raw input.
        value: String,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
}

fn join_fields(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    /// Systolic pressure text.
    pub systolic: String,
    /// Diastolic pressure text.
    pub diastolic: String,
    /// Pulse text.
    pub pulse: String,
    /// Medication value; `無` unless chosen.
    pub medication: String,
    /// Notes text.
    pub notes: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            systolic: String::new(),
            diastolic: String::new(),
            pulse: String::new(),
            medication: MEDICATION_UNSPECIFIED.to_string(),
            notes: String::new(),
        }
    }
}

/// The three numeric values of a validated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Systolic pressure.
    pub systolic: i64,
    /// Diastolic pressure.
    pub diastolic: i64,
    /// Pulse.
    pub pulse: i64,
}

impl FormFields {
    /// Check the fields and extract the numeric reading.
    ///
    /// Required fields are checked before ranges; the first failing check
    /// decides the error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequiredField`] if any numeric field
    /// is empty, or [`ValidationError::OutOfRange`] for the first value that
    /// is not a number within its range.
    pub fn validate(&self) -> std::result::Result<Reading, ValidationError> {
        let numeric = [
            (FieldId::Systolic, self.systolic.as_str(), SYSTOLIC_RANGE),
            (FieldId::Diastolic, self.diastolic.as_str(), DIASTOLIC_RANGE),
            (FieldId::Pulse, self.pulse.as_str(), PULSE_RANGE),
        ];

        let missing: Vec<FieldId> = numeric
            .iter()
            .filter(|(_, raw, _)| raw.is_empty())
            .map(|(field, _, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequiredField { fields: missing });
        }

        let mut values = [0_i64; 3];
        for (slot, (field, raw, (min, max))) in values.iter_mut().zip(numeric) {
            *slot = parse_in_range(raw, min, max).ok_or_else(|| ValidationError::OutOfRange {
                field,
                value: raw.to_string(),
                min,
                max,
            })?;
        }

        Ok(Reading {
            systolic: values[0],
            diastolic: values[1],
            pulse: values[2],
        })
    }
}

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("Invalid regex pattern")
    })
}

/// Parse a decimal number, check it against `[min, max]`, and truncate it
/// toward zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn parse_in_range(raw: &str, min: i64, max: i64) -> Option<i64> {
    let trimmed = raw.trim();
    if !decimal_pattern().is_match(trimmed) {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if value < min as f64 || value > max as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// Controller for the add-record form.
#[derive(Debug)]
pub struct FormController {
    fields: FormFields,
    focus: FieldId,
    locale: DateLocale,
}

impl FormController {
    /// Create an empty form whose records use `locale` for their datetime.
    #[must_use]
    pub fn new(locale: DateLocale) -> Self {
        Self {
            fields: FormFields::default(),
            focus: FieldId::Systolic,
            locale,
        }
    }

    /// Current field values.
    #[must_use]
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Replace all field values.
    pub fn set_fields(&mut self, fields: FormFields) {
        self.fields = fields;
    }

    /// The focused field.
    #[must_use]
    pub fn focus(&self) -> FieldId {
        self.focus
    }

    /// Move focus to `field`.
    pub fn set_focus(&mut self, field: FieldId) {
        self.focus = field;
    }

    /// The value of a single field.
    #[must_use]
    pub fn field(&self, field: FieldId) -> &str {
        match field {
            FieldId::Systolic => &self.fields.systolic,
            FieldId::Diastolic => &self.fields.diastolic,
            FieldId::Pulse => &self.fields.pulse,
            FieldId::Medication => &self.fields.medication,
            FieldId::Notes => &self.fields.notes,
        }
    }

    fn field_mut(&mut self, field: FieldId) -> &mut String {
        match field {
            FieldId::Systolic => &mut self.fields.systolic,
            FieldId::Diastolic => &mut self.fields.diastolic,
            FieldId::Pulse => &mut self.fields.pulse,
            FieldId::Medication => &mut self.fields.medication,
            FieldId::Notes => &mut self.fields.notes,
        }
    }

    /// Blank every field, restore the medication default and focus the
    /// first field.
    pub fn reset(&mut self) {
        self.fields = FormFields::default();
        self.focus = FieldId::Systolic;
    }

    /// Validate the current fields and add the resulting record.
    ///
    /// On success the form is reset and the stored record is returned. On
    /// failure neither the form nor the store changes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] if the input is rejected, or a
    /// storage error if the record cannot be persisted.
    pub fn submit(
        &mut self,
        store: &mut RecordStore,
        storage: &LocalStorage,
        clock: &dyn Clock,
    ) -> Result<Record> {
        let reading = self.fields.validate()?;

        let now = clock.now();
        let record = Record {
            id: store.next_id(now.timestamp_millis()),
            datetime: self.locale.format(&now),
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            pulse: reading.pulse,
            medication: self.fields.medication.clone(),
            notes: self.fields.notes.clone(),
        };
        debug!(?reading, "Submitting record {}", record.id);

        store.add(storage, record.clone())?;
        self.reset();

        info!(
            "Added reading {}/{} pulse {}",
            record.systolic, record.diastolic, record.pulse
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::RECORDS_KEY;
    use crate::timestamp::FixedClock;
    use chrono::{FixedOffset, TimeZone};

    fn clock() -> FixedClock {
        FixedClock(
            FixedOffset::east_opt(8 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 15, 15, 4, 5)
                .unwrap(),
        )
    }

    fn fields(systolic: &str, diastolic: &str, pulse: &str) -> FormFields {
        FormFields {
            systolic: systolic.to_string(),
            diastolic: diastolic.to_string(),
            pulse: pulse.to_string(),
            ..FormFields::default()
        }
    }

    struct Harness {
        storage: LocalStorage,
        store: RecordStore,
        form: FormController,
    }

    impl Harness {
        fn new() -> Self {
            let storage = LocalStorage::open_in_memory().unwrap();
            let store = RecordStore::load(&storage);
            Self {
                storage,
                store,
                form: FormController::new(DateLocale::ZhTw),
            }
        }

        fn submit(&mut self, input: FormFields) -> Result<Record> {
            self.form.set_fields(input);
            self.form.submit(&mut self.store, &self.storage, &clock())
        }
    }

    #[test]
    fn test_valid_submit_prepends_and_persists() {
        let mut h = Harness::new();
        h.submit(fields("110", "70", "60")).unwrap();

        let mut input = fields("128", "82", "75");
        input.medication = "已服藥".to_string();
        input.notes = "morning".to_string();
        let record = h.submit(input).unwrap();

        assert_eq!(h.store.len(), 2);
        assert_eq!(h.store.all()[0], record);

        let persisted: Vec<Record> = h.storage.get_json(RECORDS_KEY).unwrap().unwrap();
        assert_eq!(persisted[0], record);
        assert_eq!(record.medication, "已服藥");
        assert_eq!(record.notes, "morning");
    }

    #[test]
    fn test_record_takes_id_and_datetime_from_clock() {
        let mut h = Harness::new();
        let record = h.submit(fields("120", "80", "70")).unwrap();

        assert_eq!(record.id, clock().0.timestamp_millis());
        assert_eq!(record.datetime, "2024/01/15 下午03:04:05");
    }

    #[test]
    fn test_same_instant_gets_unique_ids() {
        let mut h = Harness::new();
        let first = h.submit(fields("120", "80", "70")).unwrap();
        let second = h.submit(fields("121", "81", "71")).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_submit_resets_form() {
        let mut h = Harness::new();
        let mut input = fields("120", "80", "70");
        input.medication = "未服藥".to_string();
        input.notes = "note".to_string();
        h.form.set_focus(FieldId::Notes);
        h.submit(input).unwrap();

        assert_eq!(h.form.fields(), &FormFields::default());
        assert_eq!(h.form.fields().medication, "無");
        assert_eq!(h.form.focus(), FieldId::Systolic);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut h = Harness::new();
        for input in [
            fields("", "80", "70"),
            fields("120", "", "70"),
            fields("120", "80", ""),
        ] {
            let err = h.submit(input).unwrap_err();
            assert!(matches!(
                err,
                Error::Validation(ValidationError::MissingRequiredField { .. })
            ));
        }
        assert!(h.store.is_empty());
        assert_eq!(h.storage.get_item(RECORDS_KEY).unwrap(), None);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = fields("", "80", "").validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                fields: vec![FieldId::Systolic, FieldId::Pulse],
            }
        );
        assert!(err.to_string().contains("systolic, pulse"));
    }

    #[test]
    fn test_whitespace_only_is_out_of_range() {
        let err = fields("  ", "80", "70").validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: FieldId::Systolic,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_checked_before_range() {
        let err = fields("999", "", "70").validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut h = Harness::new();
        h.submit(fields("120", "80", "70")).unwrap();

        for input in [
            fields("301", "80", "70"),
            fields("-1", "80", "70"),
            fields("120", "201", "70"),
            fields("120", "-5", "70"),
            fields("120", "80", "301"),
            fields("120", "80", "-1"),
        ] {
            let err = h.submit(input).unwrap_err();
            assert!(matches!(
                err,
                Error::Validation(ValidationError::OutOfRange { .. })
            ));
        }
        assert_eq!(h.store.len(), 1);
    }

    #[test]
    fn test_out_of_range_names_first_offender() {
        let err = fields("120", "250", "400").validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: FieldId::Diastolic,
                value: "250".to_string(),
                min: 0,
                max: 200,
            }
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        for raw in ["abc", "12abc", "NaN", "inf", "1e2", "--1"] {
            let err = fields(raw, "80", "70").validate().unwrap_err();
            assert!(
                matches!(err, ValidationError::OutOfRange { field: FieldId::Systolic, .. }),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_boundaries_accepted() {
        let reading = fields("0", "0", "0").validate().unwrap();
        assert_eq!(reading.systolic, 0);

        let reading = fields("300", "200", "300").validate().unwrap();
        assert_eq!(
            reading,
            Reading {
                systolic: 300,
                diastolic: 200,
                pulse: 300
            }
        );
    }

    #[test]
    fn test_fractional_input_truncates() {
        let reading = fields("120.9", " 80.5 ", ".5").validate().unwrap();
        assert_eq!(reading.systolic, 120);
        assert_eq!(reading.diastolic, 80);
        assert_eq!(reading.pulse, 0);
    }

    #[test]
    fn test_fraction_just_over_bound_rejected() {
        let err = fields("300.5", "80", "70").validate().unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_failed_submit_keeps_form() {
        let mut h = Harness::new();
        let input = fields("120", "", "70");
        let _ = h.submit(input.clone());
        assert_eq!(h.form.fields(), &input);
    }

    #[test]
    fn test_field_accessor() {
        let mut form = FormController::new(DateLocale::Iso);
        form.set_fields(fields("1", "2", "3"));
        assert_eq!(form.field(FieldId::Diastolic), "2");
        assert_eq!(form.field(FieldId::Medication), "無");
    }
}
