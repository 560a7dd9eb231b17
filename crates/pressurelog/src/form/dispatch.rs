//! Key-event dispatch for the record form.
//!
//! The form owns a focus context. Enter submits the form from every field
//! except the multi-line notes field, where it inserts a line break instead.

use std::fmt;

use super::FormController;
use crate::record::{MEDICATION_NOT_TAKEN, MEDICATION_TAKEN, MEDICATION_UNSPECIFIED};

/// Medication choices in the order `Left`/`Right` cycle through them.
const MEDICATION_CHOICES: [&str; 3] = [
    MEDICATION_UNSPECIFIED,
    MEDICATION_TAKEN,
    MEDICATION_NOT_TAKEN,
];

/// A form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// Systolic pressure input.
    Systolic,
    /// Diastolic pressure input.
    Diastolic,
    /// Pulse input.
    Pulse,
    /// Medication status selector.
    Medication,
    /// Multi-line notes area.
    Notes,
}

impl FieldId {
    /// Fields in focus order.
    pub const ALL: [Self; 5] = [
        Self::Systolic,
        Self::Diastolic,
        Self::Pulse,
        Self::Medication,
        Self::Notes,
    ];

    /// Whether Enter inserts a line break rather than submitting.
    #[must_use]
    pub fn is_multiline(self) -> bool {
        matches!(self, Self::Notes)
    }

    /// The field's on-screen label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Systolic => "收縮壓",
            Self::Diastolic => "舒張壓",
            Self::Pulse => "脈搏",
            Self::Medication => "藥物狀態",
            Self::Notes => "備註",
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Systolic => 0,
            Self::Diastolic => 1,
            Self::Pulse => 2,
            Self::Medication => 3,
            Self::Notes => 4,
        }
    }

    /// The next field in focus order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// The previous field in focus order, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Systolic => write!(f, "systolic"),
            Self::Diastolic => write!(f, "diastolic"),
            Self::Pulse => write!(f, "pulse"),
            Self::Medication => write!(f, "medication"),
            Self::Notes => write!(f, "notes"),
        }
    }
}

/// A key press delivered to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    /// A printable character.
    Char(char),
    /// Delete the last character of the focused field.
    Backspace,
    /// The Enter key.
    Enter,
    /// Move focus forward.
    Tab,
    /// Move focus backward.
    BackTab,
    /// Previous medication choice.
    Left,
    /// Next medication choice.
    Right,
}

/// What the form did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The focused field's value changed.
    Edited,
    /// Focus moved to another field.
    FocusChanged(FieldId),
    /// The caller should submit the form.
    Submit,
    /// The key has no meaning in the current focus context.
    Ignored,
}

impl FormController {
    /// Dispatch one key press within the form's focus context.
    pub fn handle_key(&mut self, key: FormKey) -> KeyOutcome {
        let focus = self.focus;
        match key {
            FormKey::Enter if focus.is_multiline() => {
                self.field_mut(focus).push('\n');
                KeyOutcome::Edited
            }
            FormKey::Enter => KeyOutcome::Submit,
            FormKey::Tab => {
                self.focus = focus.next();
                KeyOutcome::FocusChanged(self.focus)
            }
            FormKey::BackTab => {
                self.focus = focus.prev();
                KeyOutcome::FocusChanged(self.focus)
            }
            FormKey::Left | FormKey::Right if focus == FieldId::Medication => {
                self.cycle_medication(key == FormKey::Right);
                KeyOutcome::Edited
            }
            FormKey::Char(c) if focus != FieldId::Medication && !c.is_control() => {
                self.field_mut(focus).push(c);
                KeyOutcome::Edited
            }
            FormKey::Backspace if focus != FieldId::Medication => {
                if self.field_mut(focus).pop().is_some() {
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Ignored
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn cycle_medication(&mut self, forward: bool) {
        let len = MEDICATION_CHOICES.len();
        let current = MEDICATION_CHOICES
            .iter()
            .position(|choice| *choice == self.fields.medication);
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, _) => 0,
        };
        self.fields.medication = MEDICATION_CHOICES[next].to_string();
    }
}
