//! # Repository Module
//!
//! Database repository implementations for Quill.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                            │
//! │       │  db.quotes().get_by_id(7)                                       │
//! │       ▼                                                                 │
//! │  QuoteRepository                                                        │
//! │  ├── create / update  (quote row + items in one transaction)           │
//! │  ├── get_by_id        (quote + client copy + ordered items)            │
//! │  └── quote_numbers    (snapshot for the identifier oracle)             │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`client::ClientRepository`] - Client CRUD
//! - [`company::CompanyRepository`] - Single company profile
//! - [`quote::QuoteRepository`] - Quotes and their items

pub mod client;
pub mod company;
pub mod quote;
