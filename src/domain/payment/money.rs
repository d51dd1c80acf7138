//! Amounts in minor currency units.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A positive amount in minor units (cents, santim) with its currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount_cents: i64,
    currency: String,
}

impl Money {
    /// Creates a validated amount. The currency is upper-cased.
    pub fn new(amount_cents: i64, currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        if amount_cents <= 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                1,
                i64::MAX,
                amount_cents,
            ));
        }

        let currency = currency.as_ref().trim();
        if currency.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter currency code",
            ));
        }

        Ok(Self {
            amount_cents,
            currency: currency.to_ascii_uppercase(),
        })
    }

    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Major units with two decimals, the form provider APIs expect ("50.00").
    pub fn major_units(&self) -> String {
        format!("{}.{:02}", self.amount_cents / 100, self.amount_cents % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.major_units(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_units_pads_minor_part() {
        assert_eq!(Money::new(5000, "ETB").unwrap().major_units(), "50.00");
        assert_eq!(Money::new(1205, "ETB").unwrap().major_units(), "12.05");
        assert_eq!(Money::new(7, "ETB").unwrap().major_units(), "0.07");
    }

    #[test]
    fn currency_is_normalized_to_upper_case() {
        assert_eq!(Money::new(100, "etb").unwrap().currency(), "ETB");
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(Money::new(0, "ETB").is_err());
        assert!(Money::new(-10, "ETB").is_err());
    }

    #[test]
    fn rejects_malformed_currency() {
        assert!(matches!(
            Money::new(100, ""),
            Err(ValidationError::EmptyField { .. })
        ));
        assert!(Money::new(100, "BIRR").is_err());
        assert!(Money::new(100, "E1B").is_err());
    }

    #[test]
    fn displays_amount_and_currency() {
        assert_eq!(Money::new(50000, "ETB").unwrap().to_string(), "500.00 ETB");
    }
}
