use crate::model::Amount;
use serde::Serialize;

/// Column sums for the summary row pinned beneath the grid.
///
/// Produced by [`crate::engine::aggregate`] via direct summation of the
/// stored values; never re-derived from the ETC/EAC formulas.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Totals {
    pub budget: Amount,
    pub actuals: Amount,
    pub etc: Amount,
    pub eac: Amount,
}
