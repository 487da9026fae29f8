//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Adding and removing payments in floating point drifts:                │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │    "balance due" ends up as 0.00000000001 and finalize stays disabled  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                        │
//! │    R$ 10,00 is stored as 1000. Every sum is exact.                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Where Values Come From
//! Cashiers type amounts into masked inputs (`"1.234,56"`, `"R$ 70,00"`, `"12.5"`).
//! [`Money::parse`] normalizes those strings and rejects anything that is not a
//! number, so no NaN or half-parsed value can ever enter a transaction.
//!
//! Backends speak plain decimals (`"12.50"`, `10.0`). Those go through
//! [`Money::parse_decimal`], where `.` is always the decimal mark.
//!
//! ## Usage
//! ```rust
//! use pdv_core::money::Money;
//!
//! let price = Money::from_cents(1099);            // R$ 10,99
//! let typed = Money::parse("R$ 1.234,56").unwrap();
//! assert_eq!(typed.cents(), 123456);
//! assert_eq!(price.to_string(), "R$ 10,99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (1/100 of a real).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `total - paid` may go negative
///   before being floored by the caller
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use pdv_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole reais and centavos.
    ///
    /// For negative amounts only `reais` should be negative:
    /// `from_reais(-5, 50)` is -R$ 5,50.
    #[inline]
    pub const fn from_reais(reais: i64, centavos: i64) -> Self {
        if reais < 0 {
            Money(reais * 100 - centavos)
        } else {
            Money(reais * 100 + centavos)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion (truncated toward zero).
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Floors the value at zero.
    ///
    /// Used by every derived total: `max(0, subtotal - discount)`,
    /// `max(0, total - paid)`, `max(0, paid - total)`.
    #[inline]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies a unit price by a quantity, saturating at the i64 bounds.
    ///
    /// ```rust
    /// use pdv_core::money::Money;
    ///
    /// let line = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line.cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Parses a cashier-typed amount.
    ///
    /// ## Accepted Shapes
    /// ```text
    /// "70"            → 70,00
    /// "70,5"          → 70,50      (comma decimal, Brazilian input mask)
    /// "1.234,56"      → 1234,56    (dot thousands + comma decimal)
    /// "R$ 1.234,56"   → 1234,56    (currency prefix stripped)
    /// "10.5"          → 10,50      (dot decimal)
    /// "1.234"         → 1234,00    (single dot followed by 3 digits = grouping)
    /// "abc", "", "1,2,3", "1,234" → rejected
    /// ```
    ///
    /// More than two decimal places is rejected rather than rounded.
    pub fn parse(input: &str) -> ValidationResult<Money> {
        let compact: String = input
            .trim()
            .trim_start_matches("R$")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if compact.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, unsigned) = match compact.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, compact.as_str()),
        };

        let normalized = normalize_separators(unsigned);

        let (int_part, frac_part) = match normalized.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (normalized.as_str(), ""),
        };

        let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
        {
            return Err(invalid_amount("must be a number"));
        }

        if frac_part.len() > 2 {
            return Err(invalid_amount("must have at most 2 decimal places"));
        }

        to_cents(int_part, frac_part, negative)
    }

    /// Parses a locale-free decimal as sent by a backend.
    ///
    /// ```text
    /// "12.5"    → 12,50
    /// "10.0"    → 10,00
    /// "12.500"  → 12,50      (trailing zeros past the second place are dropped)
    /// "0.125"   → rejected   (not a whole number of centavos)
    /// "1,50", "1e2", "R$ 5" → rejected
    /// ```
    pub fn parse_decimal(input: &str) -> ValidationResult<Money> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() || !is_digits(int_part) || !is_digits(frac_part) {
            return Err(invalid_amount("must be a plain decimal number"));
        }

        let (cents_digits, rest) = frac_part.split_at(frac_part.len().min(2));
        if rest.chars().any(|c| c != '0') {
            return Err(invalid_amount("must be a whole number of centavos"));
        }

        to_cents(int_part, cents_digits, negative)
    }

    /// Renders the value as a plain decimal string with two places (`"1234.56"`).
    ///
    /// This is the wire representation: exact, locale-free, and parseable by
    /// any decimal library on the backend.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.reais().abs(), self.centavos_part())
    }
}

/// Chooses which separator is the decimal mark.
fn normalize_separators(raw: &str) -> String {
    if raw.contains(',') {
        // Comma is the decimal mark, dots are grouping.
        return raw.replace('.', "").replace(',', ".");
    }

    let dots = raw.matches('.').count();
    let grouped = dots > 1
        || (dots == 1 && raw.rsplit('.').next().map(str::len) == Some(3));

    if grouped {
        raw.replace('.', "")
    } else {
        raw.to_string()
    }
}

/// Combines already-validated digit runs; `frac` has at most two digits.
fn to_cents(int_part: &str, frac: &str, negative: bool) -> ValidationResult<Money> {
    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid_amount("is too large"))?
    };

    let fraction: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().unwrap_or(0) * 10,
        _ => frac.parse::<i64>().unwrap_or(0),
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction))
        .ok_or_else(|| invalid_amount("is too large"))?;

    Ok(Money(if negative { -cents } else { cents }))
}

fn invalid_amount(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: reason.to_string(),
    }
}

/// Inserts `.` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates instead of wrapping: a runaway line total pins at the
// i64 bound and can never flip sign.

/// Brazilian real formatting: `R$ 1.234,56`.
///
/// Display is a convenience for logs and the terminal driver; UI layers may
/// format on their own.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let reais = group_thousands(&self.reais().unsigned_abs().to_string());
        write!(f, "{}R$ {},{:02}", sign, reais, self.centavos_part())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Wire Encoding
// =============================================================================

/// Serde adapter that writes Money as an exact decimal string (`"10.50"`).
///
/// Reading accepts a decimal string or a JSON number, since catalog backends
/// are not consistent about it. Both go through [`Money::parse_decimal`].
///
/// ```rust
/// use pdv_core::money::{self, Money};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Price {
///     #[serde(with = "money::decimal")]
///     amount: Money,
/// }
///
/// let json = serde_json::to_string(&Price { amount: Money::from_cents(1050) }).unwrap();
/// assert_eq!(json, r#"{"amount":"10.50"}"#);
/// ```
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_decimal_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };
        Money::parse_decimal(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.centavos_part(), 99);
    }

    #[test]
    fn test_from_reais() {
        assert_eq!(Money::from_reais(10, 99).cents(), 1099);
        assert_eq!(Money::from_reais(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "R$ 10,99");
        assert_eq!(Money::from_cents(500).to_string(), "R$ 5,00");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5,50");
        assert_eq!(Money::from_cents(0).to_string(), "R$ 0,00");
        assert_eq!(Money::from_cents(123456).to_string(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(100000000).to_string(), "R$ 1.000.000,00");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(123456).to_decimal_string(), "1234.56");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    }

    #[test]
    fn test_parse_brazilian_input() {
        assert_eq!(Money::parse("70").unwrap().cents(), 7000);
        assert_eq!(Money::parse("70,5").unwrap().cents(), 7050);
        assert_eq!(Money::parse("70,05").unwrap().cents(), 7005);
        assert_eq!(Money::parse("1.234,56").unwrap().cents(), 123456);
        assert_eq!(Money::parse("R$ 1.234,56").unwrap().cents(), 123456);
        assert_eq!(Money::parse("  R$70,00 ").unwrap().cents(), 7000);
    }

    #[test]
    fn test_parse_dot_decimal_input() {
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse("1.234").unwrap().cents(), 123400);
        assert_eq!(Money::parse("1.234.567").unwrap().cents(), 123456700);
        assert_eq!(Money::parse("-5").unwrap().cents(), -500);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Money::parse(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(Money::parse("R$").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("NaN").is_err());
        assert!(Money::parse("1,2,3").is_err());
        assert!(Money::parse("1,234").is_err());
        assert!(Money::parse("10e3").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((b - a).non_negative(), Money::zero());

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_repeated_add_remove_has_no_drift() {
        let mut paid = Money::zero();
        let tenth = Money::parse("0,10").unwrap();
        for _ in 0..1000 {
            paid += tenth;
        }
        for _ in 0..999 {
            paid -= tenth;
        }
        assert_eq!(paid, tenth);
    }

    #[test]
    fn test_decimal_serde_roundtrip_and_numbers() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "decimal")]
            amount: Money,
        }

        let json = serde_json::to_string(&Wrapper {
            amount: Money::from_cents(1999),
        })
        .unwrap();
        assert_eq!(json, r#"{"amount":"19.99"}"#);

        let from_number: Wrapper = serde_json::from_str(r#"{"amount":19.9}"#).unwrap();
        assert_eq!(from_number.amount.cents(), 1990);

        let from_int: Wrapper = serde_json::from_str(r#"{"amount":7}"#).unwrap();
        assert_eq!(from_int.amount.cents(), 700);

        assert!(serde_json::from_str::<Wrapper>(r#"{"amount":"oops"}"#).is_err());
    }

    #[test]
    fn test_decimal_serde_three_place_amounts() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(with = "decimal")]
            amount: Money,
        }
        let read = |json: &str| serde_json::from_str::<Wrapper>(json).map(|w| w.amount.cents());

        // A dot on the wire is never a thousands separator.
        assert_eq!(read(r#"{"amount":"12.500"}"#).unwrap(), 1250);
        assert_eq!(read(r#"{"amount":"1.230"}"#).unwrap(), 123);
        assert_eq!(read(r#"{"amount":10.0}"#).unwrap(), 1000);
        assert_eq!(read(r#"{"amount":"10.0"}"#).unwrap(), 1000);

        assert!(read(r#"{"amount":0.125}"#).is_err());
        assert!(read(r#"{"amount":"0.125"}"#).is_err());
        assert!(read(r#"{"amount":"1.234"}"#).is_err());
        assert!(read(r#"{"amount":"1,50"}"#).is_err());
        assert!(read(r#"{"amount":"1e2"}"#).is_err());
    }

    #[test]
    fn test_parse_decimal_is_locale_free() {
        assert_eq!(Money::parse_decimal("1234.56").unwrap().cents(), 123456);
        assert_eq!(Money::parse_decimal("-5.5").unwrap().cents(), -550);
        assert_eq!(Money::parse_decimal("7").unwrap().cents(), 700);
        assert_eq!(Money::parse_decimal("3.10000").unwrap().cents(), 310);

        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal(".5").is_err());
        assert!(Money::parse_decimal("1.2.3").is_err());
        assert!(Money::parse_decimal("R$ 5").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());

        // The cashier parser keeps its grouping rule.
        assert_eq!(Money::parse("1.234").unwrap().cents(), 123400);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX - 1);

        assert_eq!(big.multiply_quantity(i64::MAX).cents(), i64::MAX);
        assert_eq!(Money::from_cents(-1000).multiply_quantity(i64::MAX).cents(), i64::MIN);
        assert_eq!((big + Money::from_cents(10)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);

        let total: Money = [big, big, big].iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }
}
