//! # quill-core: Pure Business Logic for Quill
//!
//! Everything the quote pipeline decides without touching the outside
//! world: line and aggregate totals, quote number generation, logo
//! geometry, display formatting and field validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Quill Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     quill (CLI commands)                        │   │
//! │  │    client add ──► quote create ──► quote export                 │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼────────────────────┐  │
//! │  │   quill-db (SQLite)         │  │   quill-render (PDF)            │  │
//! │  │   clients, company, quotes  │  │   layout, backend, merge        │  │
//! │  └──────────────┬──────────────┘  └────────────┬────────────────────┘  │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────────▼───────────────────┐   │
//! │  │               ★ quill-core (THIS CRATE) ★                        │   │
//! │  │                                                                  │   │
//! │  │   ┌─────────┐  ┌────────┐  ┌──────────────┐  ┌──────┐  ┌─────┐  │   │
//! │  │   │  types  │  │ totals │  │ quote_number │  │ logo │  │money│  │   │
//! │  │   └─────────┘  └────────┘  └──────────────┘  └──────┘  └─────┘  │   │
//! │  │                                                                  │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS               │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Company, Client, Quote, QuoteItem, QuoteStatus)
//! - [`totals`] - Subtotal / tax / total calculation
//! - [`quote_number`] - Unique quote code generation
//! - [`logo`] - Aspect-preserving logo fitting
//! - [`money`] - Display formatting and numeric input parsing
//! - [`validation`] - Minimal field checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use quill_core::{QuoteItem, Totals};
//!
//! let items = vec![
//!     QuoteItem::new("Consulting", 2.0, 500.0, 20.0),
//!     QuoteItem::new("License", 1.0, 1200.0, 20.0),
//! ];
//! let totals = Totals::calculate(&items, 0.0);
//!
//! assert_eq!(totals.subtotal, 2200.0);
//! assert_eq!(totals.tax, 440.0);
//! assert_eq!(totals.total, 2640.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod logo;
pub mod money;
pub mod quote_number;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use logo::{fit_within, Size};
pub use money::{format_amount, format_date, format_quantity, format_rate, parse_amount};
pub use quote_number::{display_quote_number, generate_quote_number};
pub use totals::Totals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency used when the company profile has none.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Tax rate (percent) a fresh company profile starts with.
pub const DEFAULT_TAX_RATE: f64 = 20.0;

/// Days between issue date and validity deadline for new quotes.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;
