//! Amount type for budget figures that arrive as spreadsheet cell text.
//!
//! This module provides the `Amount` type which wraps `Decimal` and parses
//! values that may include currency symbols, commas or other stray characters.
//! Parsing never fails: anything unrecognizable becomes zero, because an edit
//! surface must accept whatever the user typed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A budget figure with exact decimal arithmetic.
///
/// Display uses thousands separators and two decimal places:
///
/// ```
/// # use forecast_sheet::Amount;
/// let amount = Amount::parse("$1,234.5");
/// assert_eq!(amount.to_string(), "1,234.50");
/// ```
///
/// Parsing is lenient and total:
///
/// ```
/// # use forecast_sheet::Amount;
/// assert_eq!(Amount::parse("bogus"), Amount::default());
/// assert_eq!(Amount::parse("-250"), Amount::from(-250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new `Amount` from a `Decimal` value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parses cell text into an `Amount`.
    ///
    /// Every character other than digits, `.` and `-` is stripped before
    /// parsing, so `"$50,000.00"` and `"50000"` are equivalent. Text that
    /// still cannot be parsed yields zero rather than an error.
    pub fn parse(value: &str) -> Self {
        let cleaned: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        Decimal::from_str(&cleaned).map(Amount).unwrap_or_default()
    }

    /// Returns the underlying `Decimal` value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the value as `f64`, for writing to numeric spreadsheet cells.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_num::format_num!(",.2", self.to_f64()))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Canonical form is the bare decimal, without separators.
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Rows can arrive with amounts as JSON numbers or as strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Amount(Decimal::from_f64_retain(n).unwrap_or_default()),
            Raw::Text(s) => Amount::parse(&s),
        })
    }
}
