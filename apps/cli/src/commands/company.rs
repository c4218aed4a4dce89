//! # Company Commands
//!
//! Reading and editing the single issuing company profile.

use std::path::Path;

use quill_core::validation::{validate_company_name, validate_currency, validate_tax_rate};
use quill_core::{parse_amount, Company, ValidationError};
use quill_db::Database;
use quill_render::LogoImage;
use tracing::info;

use crate::args::{CompanyArgs, CompanyCommand};
use crate::error::{AppError, AppResult};

pub async fn handle(db: &Database, command: CompanyCommand) -> AppResult<()> {
    let company = match command {
        CompanyCommand::Show => show(db).await?,
        CompanyCommand::Set(args) => set(db, &args).await?,
    };
    println!("{}", serde_json::to_string_pretty(&company)?);
    Ok(())
}

/// Returns the profile, creating the default one on first use.
pub async fn show(db: &Database) -> AppResult<Company> {
    Ok(db.company().get_or_default().await?)
}

/// Applies the given fields to the stored profile.
///
/// Every field is validated before anything is saved.
pub async fn set(db: &Database, args: &CompanyArgs) -> AppResult<Company> {
    let mut company = db.company().get_or_default().await?;

    if let Some(name) = &args.name {
        validate_company_name(name)?;
        company.name = name.trim().to_string();
    }
    if let Some(currency) = &args.currency {
        validate_currency(currency)?;
        company.currency = currency.trim().to_uppercase();
    }
    if let Some(rate) = &args.tax_rate {
        let rate = parse_amount(rate, "tax rate")?;
        validate_tax_rate(rate)?;
        company.default_tax_rate = rate;
    }
    if let Some(path) = &args.logo {
        company.logo = Some(read_logo(path)?);
    }

    let text_fields = [
        (&args.email, &mut company.email),
        (&args.phone, &mut company.phone),
        (&args.address, &mut company.address),
        (&args.city, &mut company.city),
        (&args.postal_code, &mut company.postal_code),
        (&args.country, &mut company.country),
        (&args.tax_id, &mut company.tax_id),
        (&args.website, &mut company.website),
    ];
    for (value, field) in text_fields {
        if let Some(value) = value {
            *field = value.trim().to_string();
        }
    }

    let saved = db.company().save(&company).await?;
    info!(name = %saved.name, "Company profile updated");
    Ok(saved)
}

/// Reads a logo file and checks that it decodes as an image.
fn read_logo(path: &Path) -> AppResult<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|source| AppError::File {
        path: path.to_path_buf(),
        source,
    })?;

    LogoImage::from_bytes(&bytes).map_err(|e| ValidationError::InvalidFormat {
        field: "logo".to_string(),
        reason: e.to_string(),
    })?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_db;

    #[tokio::test]
    async fn test_show_creates_default_profile() {
        let db = test_db().await;

        let company = show(&db).await.unwrap();
        assert!(company.id > 0);
        assert_eq!(company.currency, "EUR");
        assert_eq!(company.default_tax_rate, 20.0);
    }

    #[tokio::test]
    async fn test_set_updates_only_given_fields() {
        let db = test_db().await;

        let args = CompanyArgs {
            name: Some(" Acme SARL ".into()),
            city: Some("Lyon".into()),
            currency: Some("usd".into()),
            tax_rate: Some("5,5".into()),
            ..Default::default()
        };
        let company = set(&db, &args).await.unwrap();
        assert_eq!(company.name, "Acme SARL");
        assert_eq!(company.currency, "USD");
        assert_eq!(company.default_tax_rate, 5.5);

        let args = CompanyArgs {
            email: Some("hello@acme.test".into()),
            ..Default::default()
        };
        let company = set(&db, &args).await.unwrap();
        assert_eq!(company.name, "Acme SARL");
        assert_eq!(company.city, "Lyon");
        assert_eq!(company.email, "hello@acme.test");
    }

    #[tokio::test]
    async fn test_set_rejects_invalid_fields() {
        let db = test_db().await;

        let short_name = CompanyArgs {
            name: Some("A".into()),
            ..Default::default()
        };
        assert!(matches!(set(&db, &short_name).await, Err(AppError::Validation(_))));

        let bad_rate = CompanyArgs {
            tax_rate: Some("120".into()),
            city: Some("Paris".into()),
            ..Default::default()
        };
        assert!(matches!(set(&db, &bad_rate).await, Err(AppError::Validation(_))));
        assert_eq!(show(&db).await.unwrap().city, "");
    }

    #[tokio::test]
    async fn test_set_logo_requires_an_image() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not an image").unwrap();

        let args = CompanyArgs {
            logo: Some(path),
            ..Default::default()
        };
        assert!(matches!(set(&db, &args).await, Err(AppError::Validation(_))));

        let missing = CompanyArgs {
            logo: Some(dir.path().join("absent.png")),
            ..Default::default()
        };
        assert!(matches!(set(&db, &missing).await, Err(AppError::File { .. })));
    }
}
