//! Persistence of forecast rows, keyed by id and filterable by project.
//!
//! The `RowStore` trait is the seam between the editing core and whatever
//! holds the data. Two implementations are provided: `SqliteStore` for real
//! persistence and `MemoryStore` for running the whole stack without a
//! database. Both publish a `ChangeEvent` after every successful write; the
//! store's echo is the source of truth for anyone subscribed.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::model::ForecastRecord;
use crate::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the change-notification channel. Slow subscribers that fall
/// further behind than this will observe a lagged receiver.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A change applied to the row-store, broadcast after the write succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeEvent {
    Inserted(ForecastRecord),
    Updated(ForecastRecord),
    Deleted(String),
}

/// CRUD over a single table of forecast rows keyed by `id`, with ordered
/// retrieval and a change-notification stream.
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    /// All rows for a project, ordered by creation time ascending.
    async fn load(&self, project_id: &str) -> Result<Vec<ForecastRecord>>;

    async fn insert(&self, project_id: &str, record: &ForecastRecord) -> Result<()>;

    /// Inserts rows one at a time, in order. Not transactional: rows
    /// inserted before a failure remain.
    async fn insert_many(&self, project_id: &str, records: &[ForecastRecord]) -> Result<()>;

    async fn update(&self, record: &ForecastRecord) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Removes every row for a project, the wipe half of a wipe-and-reinsert
    /// import.
    async fn delete_all(&self, project_id: &str) -> Result<()>;

    /// Subscribes to change notifications for rows written through this
    /// store instance.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
