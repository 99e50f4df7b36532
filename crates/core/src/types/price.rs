//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API sends prices as bare JSON numbers in the store currency,
//! so [`Price`] (de)serializes as a number rather than a string.

use core::fmt;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the store currency's standard unit (e.g., reais, not centavos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in the smallest currency unit.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display with a currency symbol (e.g., "R$ 179,90").
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        let rounded = self.0.round_dp(2);
        let formatted = format!("{rounded:.2}");
        match currency {
            CurrencyCode::BRL | CurrencyCode::EUR => {
                format!("{} {}", currency.symbol(), formatted.replace('.', ","))
            }
            _ => format!("{}{formatted}", currency.symbol()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

// Catalog prices are untrusted input, so arithmetic saturates at the
// decimal range instead of panicking.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_deserializes_from_json_numbers() {
        let whole: Price = serde_json::from_str("100").unwrap();
        assert_eq!(whole, Price::from_cents(10_000));

        let fractional: Price = serde_json::from_str("179.9").unwrap();
        assert_eq!(fractional, Price::from_cents(17_990));
    }

    #[test]
    fn test_price_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_cents(13_990)).unwrap();
        assert_eq!(json, "139.9");
    }

    #[test]
    fn test_price_display_brl() {
        assert_eq!(Price::from_cents(17_990).display(CurrencyCode::BRL), "R$ 179,90");
    }

    #[test]
    fn test_price_display_usd() {
        assert_eq!(Price::from_cents(500).display(CurrencyCode::USD), "$5.00");
    }

    #[test]
    fn test_price_arithmetic() {
        let unit = Price::from_cents(1_050);
        assert_eq!(unit * 3, Price::from_cents(3_150));

        let total: Price = [unit, Price::from_cents(50)].into_iter().sum();
        assert_eq!(total, Price::from_cents(1_100));
    }

    #[test]
    fn test_price_arithmetic_saturates() {
        let huge = Price::new(Decimal::MAX);
        assert_eq!(huge * 2, huge);

        let total: Price = [huge, huge, Price::from_cents(1)].into_iter().sum();
        assert_eq!(total, huge);
        assert!(!total.display(CurrencyCode::BRL).is_empty());
    }
}
