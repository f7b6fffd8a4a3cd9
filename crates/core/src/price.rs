//! Fixed-point price representation.
//!
//! Prices are stored as an integer count of 10^-6 currency units so that
//! comparisons and arithmetic across thousands of replayed bars are
//! bit-reproducible across runs and platforms.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sub-units per whole currency unit.
pub const PRICE_MULTIPLIER: i64 = 1_000_000;

/// A price as an integer count of 10^-6 currency units.
///
/// `FixedPrice::from_f64(100.50)` stores `100_500_000`. All arithmetic and
/// ordering operate on the raw integer; conversion back to a decimal value
/// is explicit and lossy beyond the requested precision.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPrice(pub i64);

impl FixedPrice {
    pub const ZERO: FixedPrice = FixedPrice(0);

    /// Parse a decimal string, rounding to the nearest sub-unit.
    pub fn parse_str(s: &str) -> Result<FixedPrice> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPriceFormat(s.to_string()))?;
        if !value.is_finite() {
            return Err(Error::InvalidPriceFormat(s.to_string()));
        }
        Ok(Self::from_f64(value))
    }

    /// Convert a float, rounding to the nearest sub-unit.
    pub fn from_f64(value: f64) -> FixedPrice {
        FixedPrice((value * PRICE_MULTIPLIER as f64).round() as i64)
    }

    /// Decimal value rounded to `precision` digits.
    ///
    /// Lossy beyond `precision`; the only sanctioned way back to a float.
    pub fn display(self, precision: u32) -> f64 {
        let scale = 10f64.powi(precision as i32);
        let value = self.0 as f64 / PRICE_MULTIPLIER as f64;
        (value * scale).round() / scale
    }

    /// Raw sub-unit count.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FixedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / PRICE_MULTIPLIER;
        let frac = (self.0 % PRICE_MULTIPLIER).abs();
        if self.0 < 0 && units == 0 {
            write!(f, "-0.{:06}", frac)
        } else {
            write!(f, "{}.{:06}", units, frac)
        }
    }
}

impl Add for FixedPrice {
    type Output = FixedPrice;

    fn add(self, rhs: FixedPrice) -> FixedPrice {
        FixedPrice(self.0 + rhs.0)
    }
}

impl Sub for FixedPrice {
    type Output = FixedPrice;

    fn sub(self, rhs: FixedPrice) -> FixedPrice {
        FixedPrice(self.0 - rhs.0)
    }
}

impl Mul<i64> for FixedPrice {
    type Output = FixedPrice;

    fn mul(self, rhs: i64) -> FixedPrice {
        FixedPrice(self.0 * rhs)
    }
}

/// Truncates toward zero, like host integer division.
impl Div<i64> for FixedPrice {
    type Output = FixedPrice;

    fn div(self, rhs: i64) -> FixedPrice {
        FixedPrice(self.0 / rhs)
    }
}
