//! # Client Repository
//!
//! Database operations for quote recipients. Clients are owned
//! independently of quotes; deleting one that is still referenced fails
//! with a foreign key violation.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use quill_core::Client;

const CLIENT_COLUMNS: &str = "id, name, company, email, phone, address, city, postal_code, \
                              country, tax_id, created_at, updated_at";

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Inserts a client and returns it with its id and timestamps set.
    pub async fn create(&self, client: &Client) -> DbResult<Client> {
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO clients (
                name, company, email, phone, address, city,
                postal_code, country, tax_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&client.name)
        .bind(&client.company)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.postal_code)
        .bind(&client.country)
        .bind(&client.tax_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(id, name = %client.name, "Client created");

        Ok(Client {
            id,
            created_at: now,
            updated_at: now,
            ..client.clone()
        })
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    /// Lists all clients ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name COLLATE NOCASE, id");
        let clients = sqlx::query_as::<_, Client>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    /// Updates every editable field of a client.
    pub async fn update(&self, client: &Client) -> DbResult<()> {
        debug!(id = client.id, "Updating client");

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?1, company = ?2, email = ?3, phone = ?4, address = ?5,
                city = ?6, postal_code = ?7, country = ?8, tax_id = ?9,
                updated_at = ?10
            WHERE id = ?11
            "#,
        )
        .bind(&client.name)
        .bind(&client.company)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.postal_code)
        .bind(&client.country)
        .bind(&client.tax_id)
        .bind(Utc::now())
        .bind(client.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", client.id));
        }

        Ok(())
    }

    /// Deletes a client.
    ///
    /// ## Errors
    /// - `NotFound` when the id doesn't exist
    /// - `ForeignKeyViolation` while quotes still reference the client
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
