//! The target postage amount and what is derived from it.

use crate::model::Amount;
use rust_decimal::Decimal;

/// Holds the target field exactly as typed (or as written by a suggestion).
///
/// The text is kept verbatim so that an incomplete entry such as `5.` is not rewritten under the
/// user. All numbers are derived from it on demand: text that does not start with a number, or
/// that parses negative, counts as a target of zero.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TargetTracker {
    raw: String,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` verbatim.
    pub fn set_target(&mut self, text: impl Into<String>) {
        self.raw = text.into();
    }

    /// Stores the canonical decimal form of `price` as the new text.
    pub fn set_target_from_suggestion(&mut self, price: Amount) {
        self.raw = price.canonical();
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// The text exactly as stored.
    pub fn text(&self) -> &str {
        &self.raw
    }

    /// The target as a number: zero for empty, non-numeric or negative text.
    pub fn parsed(&self) -> Amount {
        let parsed = Amount::parse_lenient(&self.raw);
        if parsed.is_negative() {
            Amount::ZERO
        } else {
            parsed
        }
    }

    /// How much postage is still missing, never below zero.
    pub fn remaining(&self, total: Amount) -> Amount {
        self.parsed().saturating_sub(total)
    }

    /// How far `total` has come toward the target as a percentage in `[0, 100]`. Zero when
    /// there is no positive target.
    pub fn progress_percent(&self, total: Amount) -> Decimal {
        let target = self.parsed();
        if !target.is_positive() {
            return Decimal::ZERO;
        }
        if total >= target {
            return Decimal::ONE_HUNDRED;
        }
        // Below the target the ratio is under one, so neither step can overflow.
        total
            .value()
            .checked_div(target.value())
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn tracker(text: &str) -> TargetTracker {
        let mut t = TargetTracker::new();
        t.set_target(text);
        t
    }

    #[test]
    fn test_remaining_and_progress() {
        let t = tracker("5");
        assert_eq!(t.remaining(amt("2")), amt("3"));
        assert_eq!(t.progress_percent(amt("2")), Decimal::from(40));
    }

    #[test]
    fn test_non_numeric_target() {
        let t = tracker("abc");
        assert_eq!(t.text(), "abc");
        assert_eq!(t.remaining(amt("2")), Amount::ZERO);
        assert_eq!(t.progress_percent(amt("2")), Decimal::ZERO);
    }

    #[test]
    fn test_negative_target_counts_as_zero() {
        let t = tracker("-4");
        assert_eq!(t.text(), "-4");
        assert_eq!(t.parsed(), Amount::ZERO);
        assert_eq!(t.remaining(Amount::ZERO), Amount::ZERO);
        assert_eq!(t.progress_percent(amt("1")), Decimal::ZERO);
    }

    #[test]
    fn test_remaining_is_clamped() {
        let t = tracker("5");
        assert_eq!(t.remaining(amt("50")), Amount::ZERO);
    }

    #[test]
    fn test_progress_is_clamped() {
        let t = tracker("5");
        assert_eq!(t.progress_percent(amt("500")), Decimal::ONE_HUNDRED);
        assert_eq!(t.progress_percent(amt("5")), Decimal::ONE_HUNDRED);
        assert_eq!(t.progress_percent(Amount::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_progress_within_bounds() {
        for target in ["0.1", "1", "3.7", "12.5", "100"] {
            let t = tracker(target);
            for total in ["0", "0.1", "2.2", "12.5", "99.9", "1000"] {
                let p = t.progress_percent(amt(total));
                assert!(p >= Decimal::ZERO && p <= Decimal::ONE_HUNDRED);
            }
        }
    }

    #[test]
    fn test_progress_with_tiny_target() {
        let t = tracker("0.0000000000000000000000000001");
        assert!(t.parsed().is_positive());
        assert_eq!(t.progress_percent(amt("50")), Decimal::ONE_HUNDRED);
        assert_eq!(t.remaining(amt("50")), Amount::ZERO);
        assert_eq!(t.progress_percent(Amount::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_progress_with_huge_target() {
        let t = tracker(&format!("1{}", "0".repeat(29)));
        assert_eq!(t.parsed().value(), Decimal::MAX);
        let p = t.progress_percent(amt("50"));
        assert!(p >= Decimal::ZERO && p < Decimal::ONE);
        assert!(t.remaining(amt("50")).is_positive());
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let t = tracker("5.");
        assert_eq!(t.text(), "5.");
        assert_eq!(t.parsed(), amt("5"));
    }

    #[test]
    fn test_set_from_suggestion() {
        let mut t = tracker("1");
        t.set_target_from_suggestion(amt("12.50"));
        assert_eq!(t.text(), "12.5");
        assert_eq!(t.remaining(amt("2.5")), amt("10"));
    }

    #[test]
    fn test_clear() {
        let mut t = tracker("7");
        t.clear();
        assert_eq!(t.text(), "");
        assert_eq!(t.parsed(), Amount::ZERO);
    }
}
