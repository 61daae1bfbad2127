use serde::{Deserialize, Serialize};

/// The closed set of forecast periods covered by the sheet.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Month {
    #[default]
    #[serde(rename = "Jan 2026")]
    Jan2026,
    #[serde(rename = "Feb 2026")]
    Feb2026,
    #[serde(rename = "Mar 2026")]
    Mar2026,
    #[serde(rename = "Apr 2026")]
    Apr2026,
    #[serde(rename = "May 2026")]
    May2026,
    #[serde(rename = "Jun 2026")]
    Jun2026,
}

serde_plain::derive_display_from_serialize!(Month);
serde_plain::derive_fromstr_from_deserialize!(Month);

impl Month {
    /// All periods, in chronological order.
    pub const ALL: [Month; 6] = [
        Month::Jan2026,
        Month::Feb2026,
        Month::Mar2026,
        Month::Apr2026,
        Month::May2026,
        Month::Jun2026,
    ];

    /// Parses cell text, coercing anything outside the period list to the
    /// first period.
    pub fn coerce(value: &str) -> Month {
        value.trim().parse().unwrap_or_default()
    }
}
