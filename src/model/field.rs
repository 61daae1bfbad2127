//! The fixed column layout shared by every edit surface.
//!
//! The grid, the per-row detail widget and the Excel export all present the
//! same seven columns in the same order. Column index 6 (EAC) is display-only
//! and therefore has no `Field` variant.

/// Column headers in the fixed presentation order.
pub const COLUMN_HEADERS: [&str; 7] = [
    "Sheet Name",
    "Forecast Type",
    "Month",
    "Budget",
    "Actuals",
    "ETC",
    "EAC",
];

/// Number of columns in the fixed layout.
pub const COLUMN_COUNT: usize = COLUMN_HEADERS.len();

/// The editable fields of a `ForecastRecord`.
///
/// EAC is deliberately absent: it is always derived and read-only on every
/// edit surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SheetName,
    ForecastType,
    Month,
    Budget,
    Actuals,
    Etc,
}

impl Field {
    /// Maps a widget column index to the editable field it represents.
    ///
    /// Returns `None` for the EAC column and for out-of-range indices; edits
    /// to those cells are ignored.
    pub fn from_column(ix: usize) -> Option<Field> {
        match ix {
            0 => Some(Field::SheetName),
            1 => Some(Field::ForecastType),
            2 => Some(Field::Month),
            3 => Some(Field::Budget),
            4 => Some(Field::Actuals),
            5 => Some(Field::Etc),
            _ => None,
        }
    }
}
