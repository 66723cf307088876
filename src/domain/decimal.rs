//! Lossless decimal money type backed by rust_decimal.
//!
//! Also hosts the lenient coercion used when reading untyped upstream payloads:
//! anything that is not a usable number becomes zero instead of an error.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Decimal value for money, rates and percentages.
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// Plain notation is tried first, then scientific notation (`1.5e3`).
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        let s = s.trim();
        RustDecimal::from_str(s)
            .or_else(|_| RustDecimal::from_scientific(s))
            .map(Decimal)
    }

    /// Format as a canonical string (trailing zeros removed, no exponent).
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// Coerce an untyped JSON value into a Decimal.
    ///
    /// Numbers and numeric strings are accepted; everything else
    /// (null, booleans, objects, garbage strings, NaN) yields zero.
    pub fn coerce(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Decimal(RustDecimal::from(i))
                } else {
                    // serde_json prints the shortest round-trip form, so 0.05 stays 0.05
                    Self::from_str_canonical(&n.to_string()).unwrap_or_default()
                }
            }
            Some(Value::String(s)) => Self::from_str_canonical(s).unwrap_or_default(),
            _ => Decimal::zero(),
        }
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

// Arithmetic saturates at the representable range instead of panicking.

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_mul(rhs.0))
    }
}

/// Division by zero yields zero; an overflowing quotient saturates.
impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        if rhs.is_zero() {
            return Decimal::zero();
        }
        match self.0.checked_div(rhs.0) {
            Some(q) => Decimal(q),
            None if self.is_negative() != rhs.is_negative() => Decimal(RustDecimal::MIN),
            None => Decimal(RustDecimal::MAX),
        }
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}
