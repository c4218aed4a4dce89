//! # quill-db: Database Layer for Quill
//!
//! Storage for clients, the company profile and quotes, using SQLite
//! through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Quill Data Flow                                │
//! │                                                                         │
//! │  CLI command (quote create)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     quill-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ClientRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CompanyRepo   │    │ 001_init.sql │  │   │
//! │  │   │               │    │ QuoteRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite file chosen by configuration (e.g. ~/.local/share/...)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("quill.db")).await?;
//! let company = db.company().get_or_default().await?;
//! let quotes = db.quotes().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::client::ClientRepository;
pub use repository::company::CompanyRepository;
pub use repository::quote::{QuoteRepository, QuoteSummary};
