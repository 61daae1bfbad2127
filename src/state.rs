//! The row-collection state container owned by the top-level view.
//!
//! An explicit, ordered collection with a narrow update interface instead of
//! ambient shared state. Remote change notifications are merged in by id,
//! last writer wins.

use crate::model::ForecastRecord;
use crate::store::ChangeEvent;

/// The in-memory collection of forecast rows currently being presented.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SheetState {
    rows: Vec<ForecastRecord>,
}

impl SheetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in presentation order.
    pub fn rows(&self) -> &[ForecastRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by id.
    pub fn get(&self, id: &str) -> Option<&ForecastRecord> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Replaces the whole collection, e.g. after a load or an import.
    pub fn replace_all(&mut self, rows: Vec<ForecastRecord>) {
        self.rows = rows;
    }

    /// Updates the row with a matching id in place, or appends the record if
    /// no row has that id.
    pub fn upsert_by_id(&mut self, record: ForecastRecord) {
        match self.rows.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.rows.push(record),
        }
    }

    /// Removes and returns the row with the given id.
    pub fn remove_by_id(&mut self, id: &str) -> Option<ForecastRecord> {
        let ix = self.rows.iter().position(|r| r.id == id)?;
        Some(self.rows.remove(ix))
    }

    /// Merges a row-store change notification into local state.
    pub fn apply_change(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Inserted(record) | ChangeEvent::Updated(record) => {
                self.upsert_by_id(record)
            }
            ChangeEvent::Deleted(id) => {
                let _ = self.remove_by_id(&id);
            }
        }
    }
}
