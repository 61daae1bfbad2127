//! Configuration file handling.
//!
//! The configuration file is stored at `<root>/config.json` and holds the
//! project identifier, the row-store database URL and the default export
//! filename.

use crate::excel::DEFAULT_EXPORT_FILENAME;
use crate::store::SqliteStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the root data directory, and from there it
/// loads `config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory (if needed) and writes an initial
    /// `config.json` with default settings.
    pub async fn create(
        dir: impl Into<PathBuf>,
        project_id: &str,
        database_url: &str,
    ) -> Result<Self> {
        let root = dir.into();
        utils::make_dir(&root)
            .await
            .context("Unable to create the forecast data directory")?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            config_version: CONFIG_VERSION,
            project_id: project_id.to_string(),
            database_url: database_url.to_string(),
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Loads an existing configuration from the data directory.
    pub async fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let root = dir.into();
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_id(&self) -> &str {
        &self.config_file.project_id
    }

    pub fn database_url(&self) -> &str {
        &self.config_file.database_url
    }

    /// The filename used for Excel exports when the caller does not supply
    /// one.
    pub fn export_filename(&self) -> &str {
        &self.config_file.export_filename
    }

    /// Opens the SQLite row store at the configured database URL.
    pub async fn open_store(&self) -> Result<SqliteStore> {
        SqliteStore::open(self.database_url()).await
    }
}

/// The serialized form of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ConfigFile {
    config_version: u8,
    project_id: String,
    database_url: String,
    #[serde(default = "default_export_filename")]
    export_filename: String,
}

fn default_export_filename() -> String {
    DEFAULT_EXPORT_FILENAME.to_string()
}

impl ConfigFile {
    async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        utils::write(path, json).await
    }

    async fn load(path: &Path) -> Result<Self> {
        utils::deserialize(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_create_then_load() {
        let env = TestEnv::new().await;
        let created = env.config();

        let loaded = Config::load(created.root()).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.project_id(), TestEnv::PROJECT_ID);
        assert_eq!(loaded.export_filename(), DEFAULT_EXPORT_FILENAME);
    }

    #[tokio::test]
    async fn test_load_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_open_store_uses_configured_url() {
        let env = TestEnv::new().await;
        let store = env.config().open_store().await.unwrap();
        // Schema is initialized; an empty load succeeds.
        use crate::store::RowStore;
        assert!(store.load(TestEnv::PROJECT_ID).await.unwrap().is_empty());
    }
}
