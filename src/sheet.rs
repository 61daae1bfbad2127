//! The editing session for one project's forecast sheet.
//!
//! Every mutation is a two-phase operation: phase 1 applies the edit to the
//! local [`SheetState`] synchronously through the engine; phase 2 commits it
//! to the [`RowStore`], and that result feeds logging only. A failed remote
//! write never rolls back local state; the user sees their edit and can
//! retry the action. The two phases are kept in separate functions so a
//! retry or rollback policy could be added later without touching the
//! engine.

use crate::engine;
use crate::excel;
use crate::model::{Field, ForecastRecord, Totals, COLUMN_HEADERS};
use crate::state::SheetState;
use crate::store::{ChangeEvent, RowStore};
use crate::Result;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

/// Row index of the header row in the 2-row detail grid.
pub const DETAIL_HEADER_ROW: usize = 0;
/// Row index of the data row in the 2-row detail grid; the only row whose
/// edits are applied.
pub const DETAIL_DATA_ROW: usize = 1;

/// One project's forecast rows, the local presentation state, and the store
/// they persist to.
pub struct ForecastSheet {
    project_id: String,
    state: SheetState,
    store: Arc<dyn RowStore>,
}

impl ForecastSheet {
    pub fn new(project_id: impl Into<String>, store: Arc<dyn RowStore>) -> Self {
        Self {
            project_id: project_id.into(),
            state: SheetState::new(),
            store,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn state(&self) -> &SheetState {
        &self.state
    }

    /// All rows in presentation order.
    pub fn rows(&self) -> &[ForecastRecord] {
        self.state.rows()
    }

    /// Column sums for the summary row.
    pub fn totals(&self) -> Totals {
        engine::aggregate(self.rows())
    }

    /// Replaces local state with the store's rows for this project.
    pub async fn load(&mut self) -> Result<()> {
        let rows = self
            .store
            .load(&self.project_id)
            .await
            .context("Failed to load forecast rows")?;
        debug!("Loaded {} rows for project '{}'", rows.len(), self.project_id);
        self.state.replace_all(rows);
        Ok(())
    }

    /// Adds a new empty row and returns it.
    pub async fn add_row(&mut self) -> ForecastRecord {
        let record = engine::new_record();
        self.state.upsert_by_id(record.clone());
        self.commit_insert(&record).await;
        record
    }

    /// Applies a field-level edit from the grid. Returns the updated record,
    /// or `None` when no row has the given id.
    pub async fn edit_field(
        &mut self,
        id: &str,
        field: Field,
        value: &str,
    ) -> Option<ForecastRecord> {
        let current = self.state.get(id)?.clone();
        let updated = engine::apply_edit(&current, field, value);
        self.state.upsert_by_id(updated.clone());
        self.commit_update(&updated).await;
        Some(updated)
    }

    /// Applies a cell-level edit from the spreadsheet-widget detail view.
    ///
    /// The widget shows one record as a 2-row grid (header + data) across
    /// the fixed seven columns. Edits outside the data row, in the EAC
    /// column, or past the last column are ignored.
    pub async fn edit_cell(
        &mut self,
        id: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Option<ForecastRecord> {
        if row != DETAIL_DATA_ROW {
            return None;
        }
        let field = Field::from_column(col)?;
        self.edit_field(id, field, value).await
    }

    /// The 2-row (header + data) snapshot of one record for the
    /// spreadsheet-widget embed, or `None` when no row has the given id.
    pub fn detail_grid(&self, id: &str) -> Option<Vec<Vec<String>>> {
        let record = self.state.get(id)?;
        let header = COLUMN_HEADERS.iter().map(|h| h.to_string()).collect();
        let data = vec![
            record.sheet_name.clone(),
            record.forecast_type.to_string(),
            record.month.to_string(),
            record.budget.to_string(),
            record.actuals.to_string(),
            record.etc.to_string(),
            record.eac.to_string(),
        ];
        Some(vec![header, data])
    }

    /// Removes a row locally and from the store.
    pub async fn delete_row(&mut self, id: &str) -> Option<ForecastRecord> {
        let removed = self.state.remove_by_id(id)?;
        self.commit_delete(id).await;
        Some(removed)
    }

    /// Imports an Excel file and replaces the whole collection with its
    /// rows. Errors only on advisory validation (unreadable file, no
    /// worksheet, no data rows), before any state is touched.
    pub async fn import_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let records = excel::import_file(path)?;
        let count = records.len();
        self.import_replace(records).await;
        Ok(count)
    }

    /// Replaces local state with `records`, then wipes and reinserts the
    /// project's rows in the store.
    ///
    /// The two remote phases are not transactional: a failure between the
    /// delete and the insert leaves the store empty while local state shows
    /// the imported rows. Failures are logged, never rolled back.
    pub async fn import_replace(&mut self, records: Vec<ForecastRecord>) {
        self.state.replace_all(records.clone());

        if let Err(e) = self.store.delete_all(&self.project_id).await {
            error!("Remote delete during import failed: {e:#}");
        }
        if let Err(e) = self.store.insert_many(&self.project_id, &records).await {
            error!("Remote insert during import failed: {e:#}");
        }
    }

    /// Exports the current rows as xlsx bytes.
    pub fn export_to_buffer(&self) -> Result<Vec<u8>> {
        excel::export_to_buffer(self.rows())
    }

    /// Exports the current rows to an xlsx file at `path`.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        excel::export_to_file(self.rows(), path)
    }

    /// Merges a store change notification into local state, last writer
    /// wins.
    pub fn apply_remote_change(&mut self, event: ChangeEvent) {
        self.state.apply_change(event);
    }

    // Phase-2 commit helpers. Local state is already updated when these run;
    // their results feed logging only.

    async fn commit_insert(&self, record: &ForecastRecord) {
        if let Err(e) = self.store.insert(&self.project_id, record).await {
            error!("Remote insert failed for row {}: {e:#}", record.id);
        }
    }

    async fn commit_update(&self, record: &ForecastRecord) {
        if let Err(e) = self.store.update(record).await {
            error!("Remote update failed for row {}: {e:#}", record.id);
        }
    }

    async fn commit_delete(&self, id: &str) {
        if let Err(e) = self.store.delete(id).await {
            error!("Remote delete failed for row {id}: {e:#}");
        }
    }
}
