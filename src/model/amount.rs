//! Amount type for handling monetary values such as stamp face values and postage targets.
//!
//! This module provides the `Amount` type which wraps `Decimal` so that sums of stamp values such
//! as `0.1 + 0.2` come out exact. It offers a strict parse (`FromStr`) for configuration and CLI
//! arguments, and a lenient parse for the free-form target field.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Represents a monetary amount.
///
/// Displayed as currency with a dollar sign, thousands separators and one fractional digit, which
/// is how stamp face values are printed on the stamps themselves.
///
/// # Examples
///
/// ```
/// # use stamp_tally::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,234.50").unwrap();
/// assert_eq!(amount.to_string(), "$1,234.5");
/// assert_eq!(amount.canonical(), "1234.5");
/// ```
///
/// The lenient parse never fails:
/// ```
/// # use stamp_tally::model::Amount;
/// assert_eq!(Amount::parse_lenient("5.").canonical(), "5");
/// assert!(Amount::parse_lenient("abc").is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Returns `self - other`, or zero if that would be negative.
    pub fn saturating_sub(self, other: Amount) -> Amount {
        let diff = self - other;
        if diff.is_negative() {
            Amount::ZERO
        } else {
            diff
        }
    }

    /// The shortest plain decimal rendering of the value: `12.5`, `12`, `0.1`. No currency sign,
    /// no separators. This is the form written into the target field.
    pub fn canonical(&self) -> String {
        self.0.normalize().to_string()
    }

    /// Parses the leading numeric portion of `text`, the way a free-form numeric input field is
    /// read while the user is still typing.
    ///
    /// - Surrounding whitespace and a leading `$` are ignored.
    /// - The longest prefix of the form `[+-]digits[.digits]` is used, so `"5."` is 5 and
    ///   `"12abc"` is 12.
    /// - Text with no digits in that prefix (empty, `"abc"`, `"."`) is zero.
    ///
    /// Negative results are returned as-is; callers decide how to treat them.
    pub fn parse_lenient(text: &str) -> Amount {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let prefix = numeric_prefix(trimmed);
        if !prefix.bytes().any(|b| b.is_ascii_digit()) {
            return Amount::ZERO;
        }
        // A trailing '.' or a bare sign before the point is fine for a human but not for Decimal.
        let cleaned = prefix.trim_end_matches('.');
        let cleaned = match cleaned.strip_prefix('+') {
            Some(rest) => rest.to_string(),
            None => cleaned.to_string(),
        };
        let cleaned = if cleaned.starts_with('.') {
            format!("0{cleaned}")
        } else if let Some(rest) = cleaned.strip_prefix("-.") {
            format!("-0.{rest}")
        } else {
            cleaned
        };
        if let Ok(value) = Decimal::from_str(&cleaned) {
            return Amount(value);
        }
        // The syntax was checked above, so the number did not fit. Keep as many fractional
        // digits as will fit, and saturate when the whole part alone is too large.
        let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
        let Ok(whole_value) = Decimal::from_str(whole) else {
            return Amount::saturated(cleaned.starts_with('-'));
        };
        let fraction = &fraction[..fraction.len().min(MAX_SCALE)];
        Decimal::from_str(&format!("{whole}.{fraction}"))
            .map(Amount)
            .unwrap_or(Amount(whole_value))
    }

    /// The largest magnitude an `Amount` can hold, with the given sign.
    fn saturated(negative: bool) -> Amount {
        if negative {
            Amount(Decimal::MIN)
        } else {
            Amount(Decimal::MAX)
        }
    }
}

/// The most fractional digits a `Decimal` can hold.
const MAX_SCALE: usize = 28;

/// Returns the longest prefix of `s` that looks like `[+-]digits[.digits]`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    &s[..end]
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let without_dollar = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(1);
        let (sign, num) = if rounded.is_sign_negative() && !rounded.is_zero() {
            ("-", rounded.abs())
        } else {
            ("", rounded)
        };
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.1", num.to_f64().unwrap_or_default())
        )
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Saturates at the largest representable magnitude instead of overflowing.
    fn add(self, rhs: Amount) -> Amount {
        match self.0.checked_add(rhs.0) {
            Some(value) => Amount(value),
            None => Amount::saturated(rhs.is_negative()),
        }
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Amount(value),
            None => Amount::saturated(rhs.is_positive()),
        }
    }
}

impl Mul<u64> for Amount {
    type Output = Amount;

    fn mul(self, rhs: u64) -> Amount {
        match self.0.checked_mul(Decimal::from(rhs)) {
            Some(value) => Amount(value),
            None => Amount::saturated(self.is_negative()),
        }
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0.normalize(), serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        rust_decimal::serde::float::deserialize(deserializer).map(Amount)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
