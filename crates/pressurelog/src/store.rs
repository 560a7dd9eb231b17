//! The record store.
//!
//! [`RecordStore`] holds the session's list of readings, newest first, and
//! mirrors it into [`LocalStorage`] under [`RECORDS_KEY`] after every
//! mutation.

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::Record;
use crate::storage::LocalStorage;

/// Storage key of the persisted record list.
pub const RECORDS_KEY: &str = "bloodPressureRecords";

/// In-memory record list backed by local storage.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Load the persisted list.
    ///
    /// A missing, malformed or wrongly shaped blob yields an empty list.
    /// Database failures are treated the same way; loading never fails.
    #[must_use]
    pub fn load(storage: &LocalStorage) -> Self {
        let records = match storage.get_json::<Vec<Record>>(RECORDS_KEY) {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring stored records: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} records", records.len());
        Self { records }
    }

    /// Prepend `record` and persist the full list.
    ///
    /// The list is only updated once the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written to storage.
    pub fn add(&mut self, storage: &LocalStorage, record: Record) -> Result<()> {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());

        storage.set_json(RECORDS_KEY, &next)?;
        debug!("Added record {}", next[0].id);
        self.records = next;
        Ok(())
    }

    /// Remove every record with the given id and persist the result.
    ///
    /// Returns how many records were removed; an unknown id removes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written to storage.
    pub fn remove(&mut self, storage: &LocalStorage, id: i64) -> Result<usize> {
        let next: Vec<Record> = self
            .records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();
        let removed = self.records.len() - next.len();

        storage.set_json(RECORDS_KEY, &next)?;
        debug!("Removed {} record(s) with id {}", removed, id);
        self.records = next;
        Ok(removed)
    }

    /// The current list, newest first.
    #[must_use]
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with `id` exists.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.records.iter().any(|record| record.id == id)
    }

    /// Pick an id for a new record.
    ///
    /// Returns `candidate` unless it is already in use, in which case the
    /// value after the largest existing id is returned.
    #[must_use]
    pub fn next_id(&self, candidate: i64) -> i64 {
        if !self.contains(candidate) {
            return candidate;
        }
        self.records
            .iter()
            .map(|record| record.id)
            .max()
            .map_or(candidate, |max| max.saturating_add(1))
    }
}
