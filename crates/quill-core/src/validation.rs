//! # Validation Module
//!
//! Minimal field checks run by the command layer before a record is
//! persisted or totals are computed.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Presence of required flags                                        │
//! │  └── Primitive types (ids, counts)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, numeric ranges                                             │
//! │  └── Discount vs. gross total                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign keys with cascade                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::totals::Totals;
use crate::types::QuoteItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Longest accepted validity period, in days.
pub const MAX_VALIDITY_DAYS: i64 = 365;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a client name: required, at most 200 characters.
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "client name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "client name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates the issuing company name: at least 2 characters.
///
/// ## Example
/// ```rust
/// use quill_core::validation::validate_company_name;
///
/// assert!(validate_company_name("Acme").is_ok());
/// assert!(validate_company_name("A").is_err());
/// ```
pub fn validate_company_name(name: &str) -> ValidationResult<()> {
    if name.trim().chars().count() < 2 {
        return Err(ValidationError::TooShort {
            field: "company name".to_string(),
            min: 2,
        });
    }
    Ok(())
}

/// Validates a currency code: three ASCII letters.
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "expected a three-letter code such as EUR".to_string(),
        });
    }
    Ok(())
}

/// Validates an item description: required, bounded length.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantity must be finite and non-negative.
pub fn validate_quantity(quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Unit price must be finite. Negative prices are allowed for credit lines.
pub fn validate_unit_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "unit price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    Ok(())
}

/// Tax rate is a percentage between 0 and 100.
pub fn validate_tax_rate(rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validity period in days: 1 to [`MAX_VALIDITY_DAYS`].
pub fn validate_validity_days(days: i64) -> ValidationResult<()> {
    if days <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "validity days".to_string(),
        });
    }
    if days > MAX_VALIDITY_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "validity days".to_string(),
            min: 1,
            max: MAX_VALIDITY_DAYS,
        });
    }
    Ok(())
}

/// Discount must be non-negative and may not exceed subtotal plus tax,
/// which keeps the quote total at or above zero.
///
/// ## Example
/// ```rust
/// use quill_core::{QuoteItem, Totals};
/// use quill_core::validation::validate_discount;
///
/// let totals = Totals::calculate(&[QuoteItem::new("Audit", 1.0, 100.0, 20.0)], 0.0);
/// assert!(validate_discount(120.0, &totals).is_ok());
/// assert!(validate_discount(120.01, &totals).is_err());
/// ```
pub fn validate_discount(discount: f64, totals: &Totals) -> ValidationResult<()> {
    if !discount.is_finite() || discount < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    let gross = totals.gross();
    if discount > gross {
        return Err(ValidationError::DiscountExceedsTotal { discount, gross });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Runs every per-field check on an item.
pub fn validate_item(item: &QuoteItem) -> ValidationResult<()> {
    validate_description(&item.description)?;
    validate_quantity(item.quantity)?;
    validate_unit_price(item.unit_price)?;
    validate_tax_rate(item.tax_rate)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_client_name() {
        assert!(validate_client_name("Jane Doe").is_ok());
        assert!(validate_client_name("   ").is_err());
        assert!(validate_client_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_company_name() {
        assert!(validate_company_name("AB").is_ok());
        assert!(matches!(
            validate_company_name(" A "),
            Err(ValidationError::TooShort { min: 2, .. })
        ));
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("usd").is_ok());
        assert!(validate_currency("EURO").is_err());
        assert!(validate_currency("E1R").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(2.5).is_ok());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(0.0).is_ok());
        assert!(validate_tax_rate(100.0).is_ok());
        assert!(validate_tax_rate(100.5).is_err());
        assert!(validate_tax_rate(-5.0).is_err());
    }

    #[test]
    fn test_validate_validity_days() {
        assert!(validate_validity_days(30).is_ok());
        assert!(matches!(
            validate_validity_days(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_validity_days(400).is_err());
    }

    #[test]
    fn test_validate_discount() {
        let totals = Totals::calculate(&[QuoteItem::new("Audit", 2.0, 50.0, 10.0)], 0.0);
        assert!(validate_discount(0.0, &totals).is_ok());
        assert!(validate_discount(110.0, &totals).is_ok());
        assert!(matches!(
            validate_discount(110.5, &totals),
            Err(ValidationError::DiscountExceedsTotal { .. })
        ));
        assert!(validate_discount(-1.0, &totals).is_err());
    }

    #[test]
    fn test_validate_item() {
        assert!(validate_item(&QuoteItem::new("Audit", 1.0, 10.0, 20.0)).is_ok());
        assert!(validate_item(&QuoteItem::new("", 1.0, 10.0, 20.0)).is_err());
        assert!(validate_item(&QuoteItem::new("Audit", -1.0, 10.0, 20.0)).is_err());
        assert!(validate_item(&QuoteItem::new("Audit", 1.0, f64::INFINITY, 20.0)).is_err());
    }
}
