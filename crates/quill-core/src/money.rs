//! # Money Formatting
//!
//! Display rules for amounts, rates, quantities and dates, plus the
//! inverse for numeric user input.
//!
//! ## Display Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount    2640.0, "EUR"   ──►  "2640.00 EUR"                          │
//! │  rate      20.0            ──►  "20%"                                  │
//! │  quantity  2.0 / 1.5       ──►  "2" / "1.5"                            │
//! │  date      2026-10-17      ──►  "17/10/2026"                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are stored as `f64` and rounded only here, at display time.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Two decimals followed by the currency code.
pub fn format_amount(value: f64, currency: &str) -> String {
    format!("{:.2} {}", value, currency)
}

/// Whole-number percentage.
pub fn format_rate(rate: f64) -> String {
    format!("{:.0}%", rate)
}

/// Up to two decimals, trailing zeros removed.
pub fn format_quantity(quantity: f64) -> String {
    let fixed = format!("{:.2}", quantity);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Day/month/year.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses a user-typed number. Surrounding whitespace is ignored and a
/// decimal comma is accepted.
///
/// ## Example
/// ```rust
/// use quill_core::parse_amount;
///
/// assert_eq!(parse_amount("12,50", "price").unwrap(), 12.5);
/// assert!(parse_amount("twelve", "price").is_err());
/// ```
pub fn parse_amount(input: &str, field: &str) -> ValidationResult<f64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let value: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a number", input.trim()),
        })?;

    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2640.0, "EUR"), "2640.00 EUR");
        assert_eq!(format_amount(0.1 + 0.2, "USD"), "0.30 USD");
        assert_eq!(format_amount(1999.999, "EUR"), "2000.00 EUR");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(20.0), "20%");
        assert_eq!(format_rate(5.6), "6%");
        assert_eq!(format_rate(0.0), "0%");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(0.25), "0.25");
        assert_eq!(format_quantity(10.0), "10");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 7).unwrap();
        assert_eq!(format_date(date), "07/10/2026");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.5 ", "price").unwrap(), 12.5);
        assert_eq!(parse_amount("12,5", "price").unwrap(), 12.5);
        assert_eq!(parse_amount("-3", "price").unwrap(), -3.0);
        assert!(matches!(
            parse_amount("   ", "price"),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_amount("1,2,3", "price"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_amount("inf", "price"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
