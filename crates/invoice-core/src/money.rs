//! Fixed-point money values
//!
//! Monetary arithmetic runs on [`Decimal`], never on binary floats. Stored
//! money is an [`Amount`]: a decimal that is always rounded to cents, half
//! away from zero, and serializes as a string with exactly two fractional
//! digits (`"250.50"`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Round to two decimal places, half away from zero
///
/// The result always carries scale 2 and is never negative zero.
///
/// # Example
/// ```ignore
/// assert_eq!(round2(dec!(12.525)).to_string(), "12.53");
/// assert_eq!(round2(dec!(-0.001)).to_string(), "0.00");
/// ```
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Parse the leading numeric part of a string, like a browser's `parseFloat`
///
/// Leading whitespace is skipped and trailing garbage ignored (`"10%"` is
/// 10). Anything without a numeric prefix, including the empty string, is
/// zero. This never fails: malformed rates are treated as "no rate".
pub fn parse_lenient(input: &str) -> Decimal {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &s[frac_start..frac_end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Decimal::ZERO;
    }

    let mut exponent = "";
    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        let mut end = pos + 1;
        if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_start {
            exponent = &s[pos + 1..end];
        }
    }

    let mut literal = String::new();
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }

    let parsed = if exponent.is_empty() {
        Decimal::from_str(&literal)
    } else {
        Decimal::from_scientific(&format!("{literal}e{}", exponent.trim_start_matches('+')))
    };

    match parsed {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(input, %err, "numeric value out of range, using zero");
            Decimal::ZERO
        }
    }
}

/// Decimal from a JSON float, via its shortest round-trip representation
///
/// `50.5` becomes exactly `50.5`, not the binary expansion.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
        .unwrap_or(Decimal::ZERO)
}

/// Multiply two decimals, yielding zero on overflow
pub(crate) fn checked_product(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "decimal overflow in product, using zero");
        Decimal::ZERO
    })
}

/// Add two decimals, yielding the left operand on overflow
pub(crate) fn checked_sum(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "decimal overflow in sum, dropping addend");
        a
    })
}

/// A monetary value rounded to cents
///
/// Every constructor goes through [`round2`], so an `Amount` can never hold
/// sub-cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// `0.00`
    pub fn zero() -> Self {
        Self(round2(Decimal::ZERO))
    }

    /// Round `value` to cents
    pub fn new(value: Decimal) -> Self {
        Self(round2(value))
    }

    /// Lenient parse of a stored money string, zero when not numeric
    pub fn parse_lenient(input: &str) -> Self {
        Self::new(parse_lenient(input))
    }

    /// The underlying decimal (scale 2)
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(LenientDecimalVisitor)
            .map(Amount::new)
    }
}

/// Accepts JSON numbers and numeric strings alike
struct LenientDecimalVisitor;

impl<'de> Visitor<'de> for LenientDecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(parse_lenient(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Ok(decimal_from_f64(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }
}

/// Serde adapter for plain decimal fields written as JSON numbers
///
/// Deserialization is lenient: numeric strings are accepted too.
pub mod serde_number {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match value.to_i64() {
            Some(whole) if value.fract().is_zero() => serializer.serialize_i64(whole),
            _ => serializer.serialize_f64(value.to_f64().unwrap_or(0.0)),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(LenientDecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(d("12.525")).to_string(), "12.53");
        assert_eq!(round2(d("-12.525")).to_string(), "-12.53");
        assert_eq!(round2(d("0.125")).to_string(), "0.13");
        assert_eq!(round2(d("2.5")).to_string(), "2.50");
        assert_eq!(round2(d("7")).to_string(), "7.00");
    }

    #[test]
    fn test_round2_never_negative_zero() {
        assert_eq!(round2(d("-0.004")).to_string(), "0.00");
    }

    #[test]
    fn test_parse_lenient_plain() {
        assert_eq!(parse_lenient("10"), d("10"));
        assert_eq!(parse_lenient("  7.5 "), d("7.5"));
        assert_eq!(parse_lenient("-3"), d("-3"));
        assert_eq!(parse_lenient("+4.25"), d("4.25"));
    }

    #[test]
    fn test_parse_lenient_prefix_and_garbage() {
        assert_eq!(parse_lenient("16%"), d("16"));
        assert_eq!(parse_lenient(".5"), d("0.5"));
        assert_eq!(parse_lenient("5."), d("5"));
        assert_eq!(parse_lenient("1e2"), d("100"));
        assert_eq!(parse_lenient("2e"), d("2"));
    }

    #[test]
    fn test_parse_lenient_non_numeric_is_zero() {
        assert_eq!(parse_lenient(""), Decimal::ZERO);
        assert_eq!(parse_lenient("abc"), Decimal::ZERO);
        assert_eq!(parse_lenient("."), Decimal::ZERO);
        assert_eq!(parse_lenient("-"), Decimal::ZERO);
        assert_eq!(parse_lenient("Infinity"), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_from_f64_is_shortest() {
        assert_eq!(decimal_from_f64(50.5), d("50.5"));
        assert_eq!(decimal_from_f64(0.1), d("0.1"));
        assert_eq!(decimal_from_f64(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_amount_display_has_two_places() {
        assert_eq!(Amount::new(d("250.5")).to_string(), "250.50");
        assert_eq!(Amount::zero().to_string(), "0.00");
        assert_eq!(Amount::default(), Amount::zero());
    }

    #[test]
    fn test_amount_serde() {
        let amount = Amount::new(d("1234.5"));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"1234.50\"");

        let from_str: Amount = serde_json::from_str("\"12.525\"").unwrap();
        assert_eq!(from_str.to_string(), "12.53");
        let from_num: Amount = serde_json::from_str("99.9").unwrap();
        assert_eq!(from_num.to_string(), "99.90");
        let from_junk: Amount = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(from_junk, Amount::zero());
    }

    #[test]
    fn test_checked_product_overflow_is_zero() {
        assert_eq!(checked_product(Decimal::MAX, d("2")), Decimal::ZERO);
        assert_eq!(checked_product(d("2"), d("3.5")), d("7"));
    }
}
