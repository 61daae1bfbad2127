//! Implements the `RowStore` trait on top of a SQLite database via sqlx.

use crate::model::{Amount, ForecastRecord, ForecastType, Month, SheetJson};
use crate::store::{ChangeEvent, RowStore, CHANGE_CHANNEL_CAPACITY};
use crate::Result;
use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::{debug, trace};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS forecast_rows (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    sheet_name TEXT NOT NULL,
    forecast_type TEXT NOT NULL,
    month TEXT NOT NULL,
    budget TEXT NOT NULL,
    actuals TEXT NOT NULL,
    etc TEXT NOT NULL,
    etc_override INTEGER NOT NULL DEFAULT 0,
    eac TEXT NOT NULL,
    sheet_json TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS ix_forecast_rows_project
    ON forecast_rows (project_id, created_at);
"#;

/// A `RowStore` backed by a single SQLite table. Every successful write
/// publishes its `ChangeEvent` on the broadcast channel.
pub struct SqliteStore {
    pool: SqlitePool,
    changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url`, e.g.
    /// `sqlite:///home/me/forecast.sqlite`, and initializes the schema.
    pub async fn open(url: &str) -> Result<Self> {
        Self::connect(SqlitePoolOptions::new(), url).await
    }

    /// Opens a private in-memory database, mainly for tests and demos.
    pub async fn in_memory() -> Result<Self> {
        // A single connection, otherwise each pooled connection would see
        // its own empty in-memory database.
        Self::connect(SqlitePoolOptions::new().max_connections(1), "sqlite::memory:").await
    }

    async fn connect(options: SqlitePoolOptions, url: &str) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite URL '{url}'"))?
            .create_if_missing(true);
        let pool = options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("Failed to open SQLite database at '{url}'"))?;
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to initialize the forecast_rows schema")?;
        debug!("Opened SQLite row store at '{url}'");
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self { pool, changes })
    }

    async fn insert_row(&self, project_id: &str, record: &ForecastRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO forecast_rows \
             (id, project_id, sheet_name, forecast_type, month, budget, actuals, etc, \
              etc_override, eac, sheet_json, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(project_id)
        .bind(&record.sheet_name)
        .bind(record.forecast_type.to_string())
        .bind(record.month.to_string())
        .bind(record.budget.value().to_string())
        .bind(record.actuals.value().to_string())
        .bind(record.etc.value().to_string())
        .bind(record.etc_override)
        .bind(record.eac.value().to_string())
        .bind(record.sheet_json.as_ref().map(|j| j.as_str().to_string()))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert forecast row {}", record.id))?;
        Ok(())
    }

    fn publish(&self, event: ChangeEvent) {
        // send only errors when there are no subscribers, which is fine.
        let _ = self.changes.send(event);
    }
}

#[async_trait::async_trait]
impl RowStore for SqliteStore {
    async fn load(&self, project_id: &str) -> Result<Vec<ForecastRecord>> {
        trace!("load for project '{project_id}'");
        let rows = sqlx::query(
            "SELECT id, sheet_name, forecast_type, month, budget, actuals, etc, \
             etc_override, eac, sheet_json \
             FROM forecast_rows WHERE project_id = ? \
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load forecast rows for project '{project_id}'"))?;
        rows.iter().map(record_from_row).collect()
    }

    async fn insert(&self, project_id: &str, record: &ForecastRecord) -> Result<()> {
        self.insert_row(project_id, record).await?;
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
        let result = sqlx::query(
            "UPDATE forecast_rows SET sheet_name = ?, forecast_type = ?, month = ?, \
             budget = ?, actuals = ?, etc = ?, etc_override = ?, eac = ?, sheet_json = ? \
             WHERE id = ?",
        )
        .bind(&record.sheet_name)
        .bind(record.forecast_type.to_string())
        .bind(record.month.to_string())
        .bind(record.budget.value().to_string())
        .bind(record.actuals.value().to_string())
        .bind(record.etc.value().to_string())
        .bind(record.etc_override)
        .bind(record.eac.value().to_string())
        .bind(record.sheet_json.as_ref().map(|j| j.as_str().to_string()))
        .bind(&record.id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update forecast row {}", record.id))?;

        if result.rows_affected() > 0 {
            self.publish(ChangeEvent::Updated(record.clone()));
        } else {
            debug!("Update matched no row with id {}", record.id);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM forecast_rows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete forecast row {id}"))?;
        if result.rows_affected() > 0 {
            self.publish(ChangeEvent::Deleted(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self, project_id: &str) -> Result<()> {
        // Collect ids first so each removal can be echoed to subscribers.
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM forecast_rows WHERE project_id = ?")
                .bind(project_id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list forecast rows before delete")?;
        sqlx::query("DELETE FROM forecast_rows WHERE project_id = ?")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete forecast rows for '{project_id}'"))?;
        for id in ids {
            self.publish(ChangeEvent::Deleted(id));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<ForecastRecord> {
    let forecast_type: String = row.try_get("forecast_type")?;
    let month: String = row.try_get("month")?;
    let budget: String = row.try_get("budget")?;
    let actuals: String = row.try_get("actuals")?;
    let etc: String = row.try_get("etc")?;
    let eac: String = row.try_get("eac")?;
    let sheet_json: Option<String> = row.try_get("sheet_json")?;
    Ok(ForecastRecord {
        id: row.try_get("id")?,
        sheet_name: row.try_get("sheet_name")?,
        forecast_type: ForecastType::coerce(&forecast_type),
        month: Month::coerce(&month),
        budget: Amount::parse(&budget),
        actuals: Amount::parse(&actuals),
        etc: Amount::parse(&etc),
        etc_override: row.try_get("etc_override")?,
        eac: Amount::parse(&eac),
        sheet_json: sheet_json.map(SheetJson::new),
    })
}
