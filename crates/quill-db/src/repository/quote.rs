//! # Quote Repository
//!
//! Database operations for quotes and their items.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quote Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                       │
//! │     └── quote_numbers() → snapshot for the identifier oracle           │
//! │     └── create() → quote row + items, one transaction                  │
//! │                                                                         │
//! │  2. EDIT                                                               │
//! │     └── recalculate_totals() in memory                                 │
//! │     └── update() → header rewritten, items replaced, one transaction   │
//! │                                                                         │
//! │  3. STATUS                                                             │
//! │     └── update_status() → any label, no transition rules               │
//! │                                                                         │
//! │  4. DELETE                                                             │
//! │     └── delete() → items removed by ON DELETE CASCADE                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stored totals are returned as written. Nothing here recomputes them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::client::ClientRepository;
use quill_core::{display_quote_number, Quote, QuoteItem, QuoteStatus};

/// Quote header as stored, without client copy or items.
#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: i64,
    quote_number: String,
    client_id: i64,
    issue_date: NaiveDate,
    valid_until: NaiveDate,
    status: QuoteStatus,
    notes: String,
    payment_terms: String,
    tax_amount: f64,
    discount: f64,
    total_amount: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One line of the quote listing.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct QuoteSummary {
    pub id: i64,
    pub quote_number: String,
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub status: QuoteStatus,
    pub total_amount: f64,
}

impl QuoteSummary {
    /// Human-facing number, e.g. `2026-10-QWERTYUI`.
    pub fn display_number(&self) -> String {
        display_quote_number(self.issue_date, &self.quote_number)
    }
}

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    /// Inserts a quote and its items in one transaction.
    ///
    /// ## Returns
    /// The quote with database ids, item positions and timestamps set.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the quote number is already taken
    /// - `ForeignKeyViolation` when `client_id` doesn't exist
    pub async fn create(&self, quote: &Quote) -> DbResult<Quote> {
        let now = Utc::now();

        debug!(quote_number = %quote.quote_number, client_id = quote.client_id, "Creating quote");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id = sqlx::query(
            r#"
            INSERT INTO quotes (
                quote_number, client_id, issue_date, valid_until, status,
                notes, payment_terms, tax_amount, discount, total_amount,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&quote.quote_number)
        .bind(quote.client_id)
        .bind(quote.issue_date)
        .bind(quote.valid_until)
        .bind(quote.status)
        .bind(&quote.notes)
        .bind(&quote.payment_terms)
        .bind(quote.tax_amount)
        .bind(quote.discount)
        .bind(quote.total_amount)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, quote.quote_number.clone())
            }
            other => other,
        })?
        .last_insert_rowid();

        let items = insert_items(&mut tx, id, &quote.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id, items = items.len(), "Quote created");

        Ok(Quote {
            id,
            items,
            created_at: now,
            updated_at: now,
            ..quote.clone()
        })
    }

    /// Gets a quote with its client copy and items ordered by position.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Quote>> {
        let row = sqlx::query_as::<_, QuoteRow>(
            r#"
            SELECT id, quote_number, client_id, issue_date, valid_until, status,
                   notes, payment_terms, tax_amount, discount, total_amount,
                   created_at, updated_at
            FROM quotes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let client = ClientRepository::new(self.pool.clone())
            .get_by_id(row.client_id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", row.client_id))?;

        let items = sqlx::query_as::<_, QuoteItem>(
            r#"
            SELECT id, quote_id, position, description, quantity, unit_price, tax_rate, amount
            FROM quote_items
            WHERE quote_id = ?1
            ORDER BY position, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Quote {
            id: row.id,
            quote_number: row.quote_number,
            client_id: row.client_id,
            client,
            issue_date: row.issue_date,
            valid_until: row.valid_until,
            status: row.status,
            notes: row.notes,
            payment_terms: row.payment_terms,
            items,
            tax_amount: row.tax_amount,
            discount: row.discount,
            total_amount: row.total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Lists quotes, newest issue date first.
    pub async fn list(&self) -> DbResult<Vec<QuoteSummary>> {
        let quotes = sqlx::query_as::<_, QuoteSummary>(
            r#"
            SELECT q.id, q.quote_number, c.name AS client_name, q.issue_date,
                   q.status, q.total_amount
            FROM quotes q
            JOIN clients c ON c.id = q.client_id
            ORDER BY q.issue_date DESC, q.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    /// Rewrites the quote header and replaces all of its items in one
    /// transaction. The quote number is never changed.
    ///
    /// Callers recompute totals first; the stored values are taken as is.
    pub async fn update(&self, quote: &Quote) -> DbResult<()> {
        debug!(id = quote.id, items = quote.items.len(), "Updating quote");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE quotes SET
                client_id = ?1, issue_date = ?2, valid_until = ?3, status = ?4,
                notes = ?5, payment_terms = ?6, tax_amount = ?7, discount = ?8,
                total_amount = ?9, updated_at = ?10
            WHERE id = ?11
            "#,
        )
        .bind(quote.client_id)
        .bind(quote.issue_date)
        .bind(quote.valid_until)
        .bind(quote.status)
        .bind(&quote.notes)
        .bind(&quote.payment_terms)
        .bind(quote.tax_amount)
        .bind(quote.discount)
        .bind(quote.total_amount)
        .bind(Utc::now())
        .bind(quote.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", quote.id));
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
            .bind(quote.id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, quote.id, &quote.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Sets the status label of a quote.
    pub async fn update_status(&self, id: i64, status: QuoteStatus) -> DbResult<()> {
        debug!(id, status = %status, "Updating quote status");

        let result = sqlx::query("UPDATE quotes SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        Ok(())
    }

    /// Deletes a quote. Its items go with it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting quote");

        let result = sqlx::query("DELETE FROM quotes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        Ok(())
    }

    /// Every quote number in use, for a synchronous uniqueness oracle.
    pub async fn quote_numbers(&self) -> DbResult<HashSet<String>> {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT quote_number FROM quotes")
            .fetch_all(&self.pool)
            .await?;

        Ok(numbers.into_iter().collect())
    }
}

/// Inserts `items` under `quote_id` with positions renumbered from 0.
async fn insert_items(
    conn: &mut SqliteConnection,
    quote_id: i64,
    items: &[QuoteItem],
) -> DbResult<Vec<QuoteItem>> {
    let mut stored = Vec::with_capacity(items.len());

    for (position, item) in items.iter().enumerate() {
        let position = position as i64;
        let id = sqlx::query(
            r#"
            INSERT INTO quote_items (
                quote_id, position, description, quantity, unit_price, tax_rate, amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(quote_id)
        .bind(position)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.tax_rate)
        .bind(item.amount)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        stored.push(QuoteItem {
            id,
            quote_id,
            position,
            ..item.clone()
        });
    }

    Ok(stored)
}

// =============================================================================
// Unit Tests
// =============================================================================
