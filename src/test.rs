//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up a data directory with a Config pointing at
/// a file-backed SQLite database. Holds the TempDir to keep the directory
/// alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub const PROJECT_ID: &'static str = "proj-test";

    /// Creates a test environment with a Config and database URL.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("forecast");
        let db_path = temp_dir.path().join("forecast.sqlite");
        let database_url = format!("sqlite://{}", db_path.display());
        let config = Config::create(&root, Self::PROJECT_ID, &database_url)
            .await
            .unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}
