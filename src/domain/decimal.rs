//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Every amount, unit price, cost and gain in the ledger flows through this type.
//! Comparisons against zero that must tolerate upstream float noise go through
//! [`Decimal::eps`] rather than exact equality.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Lossless decimal numeric type for cost-basis arithmetic.
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a decimal losslessly. Accepts plain (`"0.05"`) and scientific (`"5e-2"`) notation.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        let s = s.trim();
        RustDecimal::from_str(s)
            .or_else(|_| RustDecimal::from_scientific(s))
            .map(Decimal)
    }

    /// Canonical string without trailing zeros or exponent.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    /// Ledger tolerance, `1e-10`. Holdings below it are considered gone.
    pub fn eps() -> Self {
        Decimal(RustDecimal::new(1, 10))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// True when `|self| < EPS`.
    pub fn is_dust(&self) -> bool {
        self.abs() < Self::eps()
    }

    /// True when `|self - other| < EPS`.
    pub fn approx_eq(&self, other: Decimal) -> bool {
        (*self - other).is_dust()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Division that yields `None` instead of panicking on a zero divisor.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
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

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

/// Panics on a zero divisor; use [`Decimal::checked_div`] where the divisor may be zero.
impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, x| acc + *x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_parses_plain_and_scientific_notation() {
        assert_eq!(d("0.05"), d("5e-2"));
        assert_eq!(d(" 1000 ").to_canonical_string(), "1000");
        assert!(Decimal::from_str_canonical("abc").is_err());
    }

    #[test]
    fn test_canonical_string_drops_trailing_zeros() {
        assert_eq!(d("12.5000").to_canonical_string(), "12.5");
        assert_eq!(d("0.10").to_string(), "0.1");
    }

    #[test]
    fn test_eps_is_one_e_minus_ten() {
        assert_eq!(Decimal::eps(), d("0.0000000001"));
        assert!(d("0.00000000009").is_dust());
        assert!(!d("0.0000000001").is_dust());
        assert!(d("-0.00000000001").is_dust());
    }

    #[test]
    fn test_approx_eq_tolerates_dust() {
        assert!(d("10").approx_eq(d("10.00000000001")));
        assert!(!d("10").approx_eq(d("10.001")));
    }

    #[test]
    fn test_checked_div_by_zero_is_none() {
        assert_eq!(d("1").checked_div(Decimal::zero()), None);
        assert_eq!(d("10").checked_div(d("4")), Some(d("2.5")));
    }

    #[test]
    fn test_sums_and_assign_ops() {
        let values = vec![d("1.1"), d("2.2"), d("3.3")];
        let total: Decimal = values.iter().sum();
        assert_eq!(total, d("6.6"));

        let mut x = d("5");
        x += d("2");
        x -= d("0.5");
        assert_eq!(x, d("6.5"));
    }

    #[test]
    fn test_sign() {
        assert!(d("-3").is_negative());
        assert!(!Decimal::zero().is_positive());
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_value(d("123.456")).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }
}
