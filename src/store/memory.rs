//! Implements the `RowStore` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of the crate so
//! that the whole stack can run, top-to-bottom, without a database. The
//! `Default` implementation seeds a small demo project.

use crate::engine::{self, RawRow};
use crate::model::ForecastRecord;
use crate::store::{ChangeEvent, RowStore, CHANGE_CHANNEL_CAPACITY};
use crate::Result;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Project id used for the seeded demo rows.
pub const SEED_PROJECT_ID: &str = "demo";

/// An insertion-ordered, in-memory `RowStore`. Insertion order stands in for
/// creation-time ordering.
pub struct MemoryStore {
    rows: Mutex<Vec<StoredRow>>,
    changes: broadcast::Sender<ChangeEvent>,
}

#[derive(Debug, Clone)]
struct StoredRow {
    project_id: String,
    record: ForecastRecord,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            rows: Mutex::new(Vec::new()),
            changes,
        }
    }

    fn rows(&self) -> MutexGuard<'_, Vec<StoredRow>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: ChangeEvent) {
        let _ = self.changes.send(event);
    }
}

impl Default for MemoryStore {
    /// Loads the demo line items from this module's seed data under
    /// [`SEED_PROJECT_ID`].
    fn default() -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows();
            for record in seed_records().unwrap() {
                rows.push(StoredRow {
                    project_id: SEED_PROJECT_ID.to_string(),
                    record,
                });
            }
        }
        store
    }
}

#[async_trait::async_trait]
impl RowStore for MemoryStore {
    async fn load(&self, project_id: &str) -> Result<Vec<ForecastRecord>> {
        Ok(self
            .rows()
            .iter()
            .filter(|row| row.project_id == project_id)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn insert(&self, project_id: &str, record: &ForecastRecord) -> Result<()> {
        self.rows().push(StoredRow {
            project_id: project_id.to_string(),
            record: record.clone(),
        });
        self.publish(ChangeEvent::Inserted(record.clone()));
        Ok(())
    }

    async fn insert_many(&self, project_id: &str, records: &[ForecastRecord]) -> Result<()> {
        for record in records {
            self.insert(project_id, record).await?;
        }
        Ok(())
    }

    async fn update(&self, record: &ForecastRecord) -> Result<()> {
        let updated = {
            let mut rows = self.rows();
            match rows.iter_mut().find(|row| row.record.id == record.id) {
                Some(row) => {
                    row.record = record.clone();
                    true
                }
                None => false,
            }
        };
        if updated {
            self.publish(ChangeEvent::Updated(record.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let removed = {
            let mut rows = self.rows();
            let before = rows.len();
            rows.retain(|row| row.record.id != id);
            rows.len() < before
        };
        if removed {
            self.publish(ChangeEvent::Deleted(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self, project_id: &str) -> Result<()> {
        let removed_ids: Vec<String> = {
            let mut rows = self.rows();
            let removed = rows
                .iter()
                .filter(|row| row.project_id == project_id)
                .map(|row| row.record.id.clone())
                .collect();
            rows.retain(|row| row.project_id != project_id);
            removed
        };
        for id in removed_ids {
            self.publish(ChangeEvent::Deleted(id));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

/// Builds records from the seed data, with derived fields computed.
fn seed_records() -> Result<Vec<ForecastRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(Cursor::new(SEED_DATA.as_bytes()));
    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let raw = RawRow {
            sheet_name: row.get(0).map(String::from),
            forecast_type: row.get(1).map(String::from),
            month: row.get(2).map(String::from),
            budget: row.get(3).map(String::from),
            actuals: row.get(4).map(String::from),
        };
        records.push(engine::import_record(&raw));
    }
    Ok(records)
}

/// Seed forecast data: sheet name, forecast type, month, budget, actuals.
const SEED_DATA: &str = r##"Software Licenses,Commitment based,Jan 2026,50000,12500
Cloud Infrastructure,Time based,Jan 2026,75000,28000
Contractor Services,Commitment based,Feb 2026,120000,45000
Equipment Lease,Time based,Feb 2026,35000,8750
Marketing Campaign,Commitment based,Mar 2026,60000,15000
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, ForecastType, Month};

    #[tokio::test]
    async fn test_default_seeds_demo_project() {
        let store = MemoryStore::default();
        let rows = store.load(SEED_PROJECT_ID).await.unwrap();
        assert_eq!(rows.len(), 5);

        let first = &rows[0];
        assert_eq!(first.sheet_name, "Software Licenses");
        assert_eq!(first.forecast_type, ForecastType::CommitmentBased);
        assert_eq!(first.month, Month::Jan2026);
        assert_eq!(first.budget, Amount::from(50000));
        assert_eq!(first.actuals, Amount::from(12500));
        assert_eq!(first.etc, Amount::from(37500));
        assert_eq!(first.eac, Amount::from(50000));
        assert!(!first.etc_override);
    }

    #[tokio::test]
    async fn test_other_projects_start_empty() {
        let store = MemoryStore::default();
        assert!(store.load("proj-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_crud_and_events() {
        let store = MemoryStore::new();
        let mut subscriber = store.subscribe();

        let record = engine::new_record();
        store.insert("proj-1", &record).await.unwrap();
        assert_eq!(
            subscriber.try_recv().unwrap(),
            ChangeEvent::Inserted(record.clone())
        );

        let mut edited = record.clone();
        edited.sheet_name = "edited".to_string();
        store.update(&edited).await.unwrap();
        assert_eq!(
            store.load("proj-1").await.unwrap()[0].sheet_name,
            "edited"
        );
        assert_eq!(
            subscriber.try_recv().unwrap(),
            ChangeEvent::Updated(edited)
        );

        store.delete(&record.id).await.unwrap();
        assert!(store.load("proj-1").await.unwrap().is_empty());
        assert_eq!(
            subscriber.try_recv().unwrap(),
            ChangeEvent::Deleted(record.id.clone())
        );
    }

    #[tokio::test]
    async fn test_delete_all_scopes_to_project() {
        let store = MemoryStore::new();
        let mine = engine::new_record();
        let other = engine::new_record();
        store.insert("proj-1", &mine).await.unwrap();
        store.insert("proj-2", &other).await.unwrap();

        store.delete_all("proj-1").await.unwrap();
        assert!(store.load("proj-1").await.unwrap().is_empty());
        assert_eq!(store.load("proj-2").await.unwrap().len(), 1);
    }
}
