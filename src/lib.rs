//! Core of a spreadsheet-style editor for project budget forecast line
//! items.
//!
//! The crate owns the ETC/EAC recompute-and-override rule ([`engine`]), the
//! Excel import/export codec ([`excel`]), the local row-collection state
//! ([`state`]), persistence with change notifications ([`store`]), and the
//! editing session that ties them together ([`sheet`]). Rendering a grid or
//! a spreadsheet widget is the host application's job; this crate exposes
//! the edit seams those widgets attach to.

pub mod config;
pub mod engine;
pub mod excel;
pub mod model;
pub mod sheet;
pub mod state;
pub mod store;

mod error;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    Amount, Field, ForecastRecord, ForecastType, Month, SheetJson, Totals, COLUMN_COUNT,
    COLUMN_HEADERS,
};
pub use sheet::ForecastSheet;
pub use state::SheetState;
pub use store::{ChangeEvent, MemoryStore, RowStore, SqliteStore};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for host applications.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to this crate only.
pub fn init_logging(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the default log level for this crate only.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
