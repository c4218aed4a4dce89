//! # Company Repository
//!
//! The issuing company profile. At most one row is used: `get` returns
//! the lowest id, `get_or_default` creates it lazily with default
//! currency and tax rate.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use quill_core::Company;

const COMPANY_COLUMNS: &str = "id, name, email, phone, address, city, postal_code, country, \
                               tax_id, website, currency, default_tax_rate, logo, \
                               created_at, updated_at";

/// Repository for the company profile.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Returns the stored profile, if any.
    pub async fn get(&self) -> DbResult<Option<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY id LIMIT 1");
        let company = sqlx::query_as::<_, Company>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    /// Returns the stored profile, creating a default one when absent.
    pub async fn get_or_default(&self) -> DbResult<Company> {
        if let Some(company) = self.get().await? {
            return Ok(company);
        }

        info!("No company profile found, creating defaults");
        self.save(&Company::default()).await
    }

    /// Persists the profile: inserts when none exists yet, otherwise
    /// overwrites the existing row.
    pub async fn save(&self, company: &Company) -> DbResult<Company> {
        let now = Utc::now();

        match self.get().await? {
            None => {
                let id = sqlx::query(
                    r#"
                    INSERT INTO companies (
                        name, email, phone, address, city, postal_code, country,
                        tax_id, website, currency, default_tax_rate, logo,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                    "#,
                )
                .bind(&company.name)
                .bind(&company.email)
                .bind(&company.phone)
                .bind(&company.address)
                .bind(&company.city)
                .bind(&company.postal_code)
                .bind(&company.country)
                .bind(&company.tax_id)
                .bind(&company.website)
                .bind(&company.currency)
                .bind(company.default_tax_rate)
                .bind(company.logo.as_deref())
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await?
                .last_insert_rowid();

                debug!(id, name = %company.name, "Company profile created");

                Ok(Company {
                    id,
                    created_at: now,
                    updated_at: now,
                    ..company.clone()
                })
            }
            Some(existing) => {
                let result = sqlx::query(
                    r#"
                    UPDATE companies SET
                        name = ?1, email = ?2, phone = ?3, address = ?4, city = ?5,
                        postal_code = ?6, country = ?7, tax_id = ?8, website = ?9,
                        currency = ?10, default_tax_rate = ?11, logo = ?12,
                        updated_at = ?13
                    WHERE id = ?14
                    "#,
                )
                .bind(&company.name)
                .bind(&company.email)
                .bind(&company.phone)
                .bind(&company.address)
                .bind(&company.city)
                .bind(&company.postal_code)
                .bind(&company.country)
                .bind(&company.tax_id)
                .bind(&company.website)
                .bind(&company.currency)
                .bind(company.default_tax_rate)
                .bind(company.logo.as_deref())
                .bind(now)
                .bind(existing.id)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Company", existing.id));
                }

                debug!(id = existing.id, "Company profile updated");

                Ok(Company {
                    id: existing.id,
                    created_at: existing.created_at,
                    updated_at: now,
                    ..company.clone()
                })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_on_empty_database() {
        let db = setup().await;
        assert!(db.company().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_default_creates_once() {
        let db = setup().await;

        let first = db.company().get_or_default().await.unwrap();
        assert!(first.id > 0);
        assert_eq!(first.currency, "EUR");
        assert_eq!(first.default_tax_rate, 20.0);

        let second = db.company().get_or_default().await.unwrap();
        assert_eq!(first.id, second.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_save_overwrites_single_row() {
        let db = setup().await;
        let mut company = db.company().get_or_default().await.unwrap();

        company.name = "Quill Studio".to_string();
        company.currency = "USD".to_string();
        company.logo = Some(vec![0x89, b'P', b'N', b'G']);

        // A caller-supplied id is ignored; the existing row wins.
        let saved = db
            .company()
            .save(&Company {
                id: 77,
                ..company.clone()
            })
            .await
            .unwrap();
        assert_eq!(saved.id, company.id);

        let loaded = db.company().get().await.unwrap().unwrap();
        assert_eq!(loaded.name, "Quill Studio");
        assert_eq!(loaded.currency, "USD");
        assert_eq!(loaded.logo.as_deref(), Some(&[0x89, b'P', b'N', b'G'][..]));
    }
}
