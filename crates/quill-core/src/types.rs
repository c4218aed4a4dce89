//! # Domain Types
//!
//! Core domain types used throughout Quill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Company      │   │     Quote       │   │   QuoteItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  single row     │   │  quote_number   │◄──│  quote_id (FK)  │       │
//! │  │  currency       │   │  client_id (FK) │   │  quantity       │       │
//! │  │  default rate   │   │  status         │   │  unit_price     │       │
//! │  │  logo bytes     │   │  totals         │   │  tax_rate       │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │                        │     Client      │   │  QuoteStatus    │       │
//! │                        │  ─────────────  │   │  draft, sent,   │       │
//! │                        │  owned apart    │   │  accepted, ...  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: SQLite rowid, used for relations and CLI arguments
//! - `quote_number`: 8-letter code printed on the document

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::quote_number::display_quote_number;
use crate::totals::Totals;
use crate::{DEFAULT_CURRENCY, DEFAULT_TAX_RATE};

// =============================================================================
// Company
// =============================================================================

/// The issuing company. At most one exists per database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub tax_id: String,
    pub website: String,
    /// ISO currency code printed after every amount.
    pub currency: String,
    /// Percentage applied to new items when none is given.
    pub default_tax_rate: f64,
    /// Raw logo image (PNG or JPEG).
    #[serde(skip_serializing, default)]
    pub logo: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Company {
    fn default() -> Self {
        Company {
            id: 0,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: String::new(),
            tax_id: String::new(),
            website: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            default_tax_rate: DEFAULT_TAX_RATE,
            logo: None,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }
}

impl Company {
    /// Currency code, falling back to the default when blank.
    pub fn currency(&self) -> &str {
        let code = self.currency.trim();
        if code.is_empty() {
            DEFAULT_CURRENCY
        } else {
            code
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer quotes are addressed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,
    /// Contact person or trading name.
    pub name: String,
    /// Legal entity, printed only when it differs from `name`.
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub tax_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates an unsaved client with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Client {
            name: name.into(),
            ..Client::default()
        }
    }

    /// Returns the company name when it is set and distinct from the
    /// contact name.
    pub fn distinct_company(&self) -> Option<&str> {
        let company = self.company.trim();
        if company.is_empty() || company == self.name.trim() {
            None
        } else {
            Some(company)
        }
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// Lifecycle label of a quote. Transitions are not restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being edited, not yet sent.
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: QuoteStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Quote Item
// =============================================================================

/// A line of a quote. Owned by exactly one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuoteItem {
    pub id: i64,
    pub quote_id: i64,
    /// Display order within the quote, starting at 0.
    pub position: i64,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Percentage, e.g. `20.0` for 20%.
    pub tax_rate: f64,
    /// Tax-exclusive line total (quantity × unit price).
    pub amount: f64,
}

impl QuoteItem {
    /// Creates an unsaved item with its amount already computed.
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64, tax_rate: f64) -> Self {
        QuoteItem {
            id: 0,
            quote_id: 0,
            position: 0,
            description: description.into(),
            quantity,
            unit_price,
            tax_rate,
            amount: quantity * unit_price,
        }
    }

    /// Tax-exclusive line total.
    #[inline]
    pub fn line_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Tax owed on this line.
    #[inline]
    pub fn line_tax(&self) -> f64 {
        self.line_amount() * self.tax_rate / 100.0
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A quote with its items and a denormalized copy of its client.
///
/// ## Derived Fields
/// `tax_amount`, `discount` and `total_amount` are stored, not recomputed
/// on read. Call [`Quote::recalculate_totals`] after touching `items` or
/// `discount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    /// 8-letter unique code.
    pub quote_number: String,
    pub client_id: i64,
    /// Copy of the referenced client, used for rendering.
    pub client: Client,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: QuoteStatus,
    pub notes: String,
    pub payment_terms: String,
    pub items: Vec<QuoteItem>,
    pub tax_amount: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Creates an unsaved draft for `client`, valid `validity_days` after
    /// `issue_date`.
    pub fn draft(
        quote_number: impl Into<String>,
        client: Client,
        issue_date: NaiveDate,
        validity_days: i64,
    ) -> Self {
        Quote {
            id: 0,
            quote_number: quote_number.into(),
            client_id: client.id,
            client,
            issue_date,
            valid_until: issue_date + chrono::Duration::days(validity_days),
            status: QuoteStatus::Draft,
            notes: String::new(),
            payment_terms: String::new(),
            items: Vec::new(),
            tax_amount: 0.0,
            discount: 0.0,
            total_amount: 0.0,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    /// Tax-exclusive subtotal derived from the stored fields.
    #[inline]
    pub fn subtotal(&self) -> f64 {
        self.total_amount - self.tax_amount + self.discount
    }

    /// Stored totals as a [`Totals`] value.
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal(),
            tax: self.tax_amount,
            discount: self.discount,
            total: self.total_amount,
        }
    }

    /// Re-runs the totals calculator over `items` and `discount`, and
    /// refreshes each item's stored amount and position.
    pub fn recalculate_totals(&mut self) -> Totals {
        for (position, item) in self.items.iter_mut().enumerate() {
            item.amount = item.line_amount();
            item.position = position as i64;
        }
        let totals = Totals::calculate(&self.items, self.discount);
        self.tax_amount = totals.tax;
        self.total_amount = totals.total;
        totals
    }

    /// Human-facing number, e.g. `2026-10-QWERTYUI`.
    pub fn display_number(&self) -> String {
        display_quote_number(self.issue_date, &self.quote_number)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("draft".parse::<QuoteStatus>().unwrap(), QuoteStatus::Draft);
        assert_eq!(" Accepted ".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert_eq!("expired".parse::<QuoteStatus>().unwrap(), QuoteStatus::Expired);
        assert!(matches!(
            "archived".parse::<QuoteStatus>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_status_display_round_trips_through_serde_names() {
        for status in QuoteStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_company_defaults() {
        let company = Company::default();
        assert_eq!(company.currency, "EUR");
        assert_eq!(company.default_tax_rate, 20.0);
        assert!(company.logo.is_none());
    }

    #[test]
    fn test_blank_currency_falls_back() {
        let company = Company {
            currency: "  ".to_string(),
            ..Company::default()
        };
        assert_eq!(company.currency(), "EUR");
    }

    #[test]
    fn test_distinct_company() {
        let mut client = Client::new("ACME");
        client.company = "ACME".to_string();
        assert_eq!(client.distinct_company(), None);

        client.company = "ACME Holdings SA".to_string();
        assert_eq!(client.distinct_company(), Some("ACME Holdings SA"));

        client.company = String::new();
        assert_eq!(client.distinct_company(), None);
    }

    #[test]
    fn test_draft_validity_and_display_number() {
        let quote = Quote::draft("ABCDEFGH", Client::new("Jane"), date(2026, 1, 15), 30);
        assert_eq!(quote.valid_until, date(2026, 2, 14));
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.display_number(), "2026-01-ABCDEFGH");
    }

    #[test]
    fn test_recalculate_totals_updates_stored_fields() {
        let mut quote = Quote::draft("ABCDEFGH", Client::new("Jane"), date(2026, 1, 15), 30);
        quote.items.push(QuoteItem::new("Consulting", 2.0, 500.0, 20.0));
        quote.items.push(QuoteItem::new("License", 1.0, 1200.0, 20.0));
        quote.discount = 40.0;

        // Mutate an item after construction; the stored amount goes stale.
        quote.items[1].quantity = 2.0;
        let totals = quote.recalculate_totals();

        assert_eq!(quote.items[1].amount, 2400.0);
        assert_eq!(quote.items[1].position, 1);
        assert_eq!(totals.subtotal, 3400.0);
        assert_eq!(quote.tax_amount, 680.0);
        assert_eq!(quote.total_amount, 4040.0);
        assert_eq!(quote.subtotal(), 3400.0);
    }
}
