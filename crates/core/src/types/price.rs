//! Non-negative price amounts in the marketplace's single currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative price amount.
///
/// The marketplace operates in a single currency, so this wraps a bare
/// [`Decimal`] rather than an amount/currency pair. Negative amounts cannot
/// be represented: construction clamps them to zero, matching how the
/// normalizer treats malformed raw prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price, the fallback for missing or malformed amounts.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, clamping negative amounts to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self(Decimal::ZERO)
        } else {
            Self(amount)
        }
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Format for display, e.g. `$19.99`.
    #[must_use]
    pub fn display(self) -> String {
        format!("${:.2}", self.0)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Sum of two prices.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(Price::new(d("-4.20")), Price::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::new(d("19.9")).display(), "$19.90");
        assert_eq!(Price::ZERO.display(), "$0.00");
    }

    #[test]
    fn test_line_totals() {
        let unit = Price::new(d("12.50"));
        assert_eq!(unit.times(3), Price::new(d("37.50")));
        assert_eq!(unit.plus(Price::new(d("0.50"))), Price::new(d("13.00")));
    }
}
