//! Types that represent the core data model, such as `ForecastRecord` and `Amount`.
mod amount;
mod field;
mod forecast_type;
mod month;
mod record;
mod totals;

pub use amount::Amount;
pub use field::{Field, COLUMN_COUNT, COLUMN_HEADERS};
pub use forecast_type::ForecastType;
pub use month::Month;
pub use record::{ForecastRecord, SheetJson};
pub use totals::Totals;
