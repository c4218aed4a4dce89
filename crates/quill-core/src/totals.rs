//! # Totals Calculator
//!
//! Computes the three derived monetary fields of a quote.
//!
//! ```text
//!   subtotal = Σ quantity × unit_price
//!   tax      = Σ (quantity × unit_price) × tax_rate / 100
//!   total    = subtotal + tax − discount
//! ```
//!
//! Plain `f64` arithmetic with no intermediate rounding; amounts are rounded
//! to two decimals only when displayed. Inputs are not range-checked here,
//! see [`crate::validation`].

use serde::{Deserialize, Serialize};

use crate::types::QuoteItem;

/// Aggregate amounts of a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Tax-exclusive sum of line amounts.
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    /// Tax-inclusive total after discount.
    pub total: f64,
}

impl Totals {
    /// Runs the calculator over `items` with a separate `discount`.
    ///
    /// An empty item list yields `total == -discount`.
    pub fn calculate(items: &[QuoteItem], discount: f64) -> Self {
        let (subtotal, tax) = items.iter().fold((0.0, 0.0), |(subtotal, tax), item| {
            (subtotal + item.line_amount(), tax + item.line_tax())
        });

        Totals {
            subtotal,
            tax,
            discount,
            total: subtotal + tax - discount,
        }
    }

    /// Subtotal plus tax, before the discount is taken off.
    #[inline]
    pub fn gross(&self) -> f64 {
        self.subtotal + self.tax
    }
}

impl From<&[QuoteItem]> for Totals {
    fn from(items: &[QuoteItem]) -> Self {
        Totals::calculate(items, 0.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_reference_quote() {
        let items = vec![
            QuoteItem::new("Consulting", 2.0, 500.0, 20.0),
            QuoteItem::new("License", 1.0, 1200.0, 20.0),
        ];
        let totals = Totals::calculate(&items, 0.0);

        assert_eq!(totals.subtotal, 2200.0);
        assert_eq!(totals.tax, 440.0);
        assert_eq!(totals.total, 2640.0);
    }

    #[test]
    fn test_empty_items_total_is_negative_discount() {
        let totals = Totals::calculate(&[], 25.0);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, -25.0);
    }

    #[test]
    fn test_identities_hold_for_mixed_items() {
        let items = vec![
            QuoteItem::new("Audit", 3.5, 129.99, 20.0),
            QuoteItem::new("Travel", 1.0, 87.3, 0.0),
            QuoteItem::new("Hosting", 12.0, 9.95, 5.5),
            QuoteItem::new("Rebate", 1.0, -15.0, 20.0),
        ];
        let discount = 12.5;
        let totals = Totals::calculate(&items, discount);

        let subtotal: f64 = items.iter().map(|i| i.quantity * i.unit_price).sum();
        let tax: f64 = items
            .iter()
            .map(|i| i.quantity * i.unit_price * i.tax_rate / 100.0)
            .sum();

        assert!(close(totals.subtotal, subtotal));
        assert!(close(totals.tax, tax));
        assert!(close(totals.total, totals.subtotal + totals.tax - discount));
        assert!(close(totals.gross() - totals.discount, totals.total));
    }

    #[test]
    fn test_fractional_quantities() {
        let items = vec![QuoteItem::new("Design", 0.25, 800.0, 10.0)];
        let totals = Totals::calculate(&items, 0.0);
        assert!(close(totals.subtotal, 200.0));
        assert!(close(totals.tax, 20.0));
        assert!(close(totals.total, 220.0));
    }

    #[test]
    fn test_stale_item_amount_is_ignored() {
        // The calculator works from quantity and price, never the stored amount.
        let mut item = QuoteItem::new("Support", 1.0, 100.0, 20.0);
        item.amount = 9999.0;
        let totals = Totals::from(std::slice::from_ref(&item));
        assert_eq!(totals.subtotal, 100.0);
        assert_eq!(totals.total, 120.0);
    }
}
