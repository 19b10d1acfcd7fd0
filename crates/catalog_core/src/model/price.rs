//! Exact currency amounts.
//!
//! # Invariants
//! - Stored value always has scale 2 and fits `NUMERIC(10, 2)`.
//! - Extra fractional digits are rounded half-up (midpoint away from zero).
//! - Never negative.

use crate::model::validation::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Number of fractional digits kept for prices.
pub const PRICE_SCALE: u32 = 2;
/// Largest representable price in minor units (`99_999_999.99`).
pub const MAX_PRICE_CENTS: i64 = 9_999_999_999;

/// Non-negative fixed-point amount with two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Rounds `value` half-up to two places and range-checks it.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        let mut rounded =
            value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        if rounded.is_sign_negative() {
            return Err(ValidationError::NegativePrice);
        }
        if rounded > Decimal::new(MAX_PRICE_CENTS, PRICE_SCALE) {
            return Err(ValidationError::PriceOutOfRange(value.to_string()));
        }
        rounded.rescale(PRICE_SCALE);
        Ok(Self(rounded))
    }

    /// Builds a price from integer minor units.
    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        if cents < 0 {
            return Err(ValidationError::NegativePrice);
        }
        if cents > MAX_PRICE_CENTS {
            return Err(ValidationError::PriceOutOfRange(cents.to_string()));
        }
        Ok(Self(Decimal::new(cents, PRICE_SCALE)))
    }

    /// Value in minor units, as persisted.
    pub fn cents(&self) -> i64 {
        i64::try_from(self.0.mantissa()).unwrap_or(MAX_PRICE_CENTS)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
