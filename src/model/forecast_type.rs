use serde::{Deserialize, Serialize};

/// How a line item's forecast is driven.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ForecastType {
    #[default]
    #[serde(rename = "Commitment based")]
    CommitmentBased,
    #[serde(rename = "Time based")]
    TimeBased,
}

serde_plain::derive_display_from_serialize!(ForecastType);
serde_plain::derive_fromstr_from_deserialize!(ForecastType);

impl ForecastType {
    /// All forecast types, in presentation order.
    pub const ALL: [ForecastType; 2] = [ForecastType::CommitmentBased, ForecastType::TimeBased];

    /// Parses cell text, coercing anything unrecognized to `Commitment based`.
    pub fn coerce(value: &str) -> ForecastType {
        value.trim().parse().unwrap_or_default()
    }
}
