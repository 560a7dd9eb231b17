//! One run of the application.
//!
//! A [`Session`] loads the record list and theme once when it opens and
//! wires the form, store, renderer and theme together. Every mutation is
//! written to storage before the method returns.

use std::io::{self, IsTerminal};

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::form::{FormController, FormFields};
use crate::record::Record;
use crate::render::{render_all, render_text, ListView};
use crate::storage::LocalStorage;
use crate::store::RecordStore;
use crate::theme::{Theme, ThemeController};
use crate::timestamp::{Clock, DateLocale, SystemClock};

/// Question asked before a record is deleted.
pub const DELETE_CONFIRM_PROMPT: &str = "確定要刪除這筆紀錄嗎？";

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record was removed.
    Deleted,
    /// The user declined; nothing changed.
    Declined,
    /// No record has that id; nothing changed.
    NotFound,
}

/// Application state for one run.
#[derive(Debug)]
pub struct Session {
    storage: LocalStorage,
    records: RecordStore,
    theme: ThemeController,
    form: FormController,
    clock: Box<dyn Clock>,
    color: bool,
}

impl Session {
    /// Open the configured storage and load the session state.
    ///
    /// Color is only used when stdout is a terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage database cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let storage = LocalStorage::open(config.database_path())?;
        Ok(Self::with_storage(
            storage,
            config.date_locale(),
            Box::new(SystemClock),
            use_color(config, io::stdout().is_terminal()),
        ))
    }

    /// Build a session over an already opened storage.
    #[must_use]
    pub fn with_storage(
        storage: LocalStorage,
        locale: DateLocale,
        clock: Box<dyn Clock>,
        color: bool,
    ) -> Self {
        let records = RecordStore::load(&storage);
        let theme = ThemeController::load(&storage);
        info!(
            "Session started with {} records, {} theme",
            records.len(),
            theme.current()
        );
        Self {
            storage,
            records,
            theme,
            form: FormController::new(locale),
            clock,
            color,
        }
    }

    /// The records, newest first.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        self.records.all()
    }

    /// The theme controller.
    #[must_use]
    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    /// The form.
    #[must_use]
    pub fn form(&self) -> &FormController {
        &self.form
    }

    /// The form, for key dispatch.
    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    /// Submit the form as it currently stands.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the input is rejected, or a storage
    /// error if the record cannot be saved.
    pub fn submit_form(&mut self) -> Result<Record> {
        self.form
            .submit(&mut self.records, &self.storage, self.clock.as_ref())
    }

    /// Fill the form with `fields` and submit it.
    ///
    /// # Errors
    ///
    /// See [`Session::submit_form`].
    pub fn add(&mut self, fields: FormFields) -> Result<Record> {
        self.form.set_fields(fields);
        self.submit_form()
    }

    /// Delete the record with `id` once `confirm` agrees.
    ///
    /// `confirm` is only asked when the record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if `confirm` fails or the list cannot be saved.
    pub fn delete<F>(&mut self, id: i64, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&Record) -> Result<bool>,
    {
        let Some(record) = self.records.all().iter().find(|r| r.id == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !confirm(record)? {
            return Ok(DeleteOutcome::Declined);
        }
        self.records.remove(&self.storage, id)?;
        info!("Deleted record {}", id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Flip the theme and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be saved.
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.theme.toggle(&self.storage)
    }

    /// The current list view.
    #[must_use]
    pub fn view(&self) -> ListView {
        render_all(self.records.all())
    }

    /// The current list as terminal text, colored when enabled.
    #[must_use]
    pub fn render_text(&self, selected: Option<usize>) -> String {
        let palette = self.color.then(|| self.theme.palette());
        render_text(&self.view(), palette.as_ref(), selected)
    }
}

/// Whether list output should carry color escapes.
fn use_color(config: &Config, stdout_is_terminal: bool) -> bool {
    config.display.color && stdout_is_terminal
}
