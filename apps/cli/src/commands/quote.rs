//! # Quote Commands
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  --item "Audit;2;1000" ... ──► parse_item ──► validate_item            │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │  quote_numbers() snapshot ──► generate_quote_number (100 draws)        │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │  recalculate_totals ──► validate_discount ──► QuoteRepository::create  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edit loads the stored quote, applies the changes, then runs the same
//! `recalculate_totals ──► validate_discount` pair before
//! `QuoteRepository::update` replaces header and items.
//!
//! Export reads the stored quote and hands it to [`QuoteExporter`]; the
//! totals printed are the stored ones.

use chrono::{Duration, Local, Months, NaiveDate};
use quill_core::validation::{validate_discount, validate_item, validate_validity_days, ValidationResult};
use quill_core::{format_amount, generate_quote_number, parse_amount, Quote, QuoteItem, QuoteStatus, ValidationError};
use quill_db::Database;
use quill_render::{default_export_path, ExportReport, QuoteExporter};
use std::path::PathBuf;
use tracing::info;

use crate::args::{CreateQuoteArgs, EditQuoteArgs, QuoteCommand};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub async fn handle(db: &Database, config: &AppConfig, command: QuoteCommand) -> AppResult<()> {
    let today = Local::now().date_naive();

    match command {
        QuoteCommand::Create(args) => {
            let quote = create(db, config, &args, today).await?;
            let currency = db.company().get_or_default().await?.currency().to_string();
            println!(
                "Quote {} created (id {}), total {}",
                quote.display_number(),
                quote.id,
                format_amount(quote.total_amount, &currency)
            );
        }
        QuoteCommand::List => {
            let currency = db.company().get_or_default().await?.currency().to_string();
            let quotes = db.quotes().list().await?;
            if quotes.is_empty() {
                println!("No quotes.");
            }
            for q in quotes {
                println!(
                    "{:>5}  {}  {:<9} {:>16}  {}",
                    q.id,
                    q.display_number(),
                    q.status.as_str(),
                    format_amount(q.total_amount, &currency),
                    q.client_name
                );
            }
        }
        QuoteCommand::Show { id } => {
            let quote = find(db, id).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        QuoteCommand::Edit { id, changes } => {
            let quote = edit(db, id, &changes).await?;
            let currency = db.company().get_or_default().await?.currency().to_string();
            println!(
                "Quote {} updated: {} item(s), total {}",
                quote.display_number(),
                quote.items.len(),
                format_amount(quote.total_amount, &currency)
            );
        }
        QuoteCommand::Status { id, status } => {
            let status = set_status(db, id, &status).await?;
            println!("Quote {} is now {}", id, status);
        }
        QuoteCommand::Duplicate { id } => {
            let copy = duplicate(db, id, today).await?;
            println!("Quote {} duplicated as {} (id {})", id, copy.display_number(), copy.id);
        }
        QuoteCommand::Delete { id } => {
            db.quotes().delete(id).await?;
            info!(id, "Quote deleted");
            println!("Quote {} deleted", id);
        }
        QuoteCommand::Export { id, output } => {
            let report = export(db, config, id, output).await?;
            println!(
                "Wrote {} ({} page(s), {} from terms)",
                report.path.display(),
                report.total_pages(),
                report.terms_pages
            );
        }
    }
    Ok(())
}

// =============================================================================
// Operations
// =============================================================================

/// Creates a draft quote numbered with a fresh 8-letter code.
pub async fn create(
    db: &Database,
    config: &AppConfig,
    args: &CreateQuoteArgs,
    today: NaiveDate,
) -> AppResult<Quote> {
    let client = db
        .clients()
        .get_by_id(args.client)
        .await?
        .ok_or_else(|| AppError::not_found("Client", args.client))?;
    let company = db.company().get_or_default().await?;

    let items = args
        .items
        .iter()
        .map(|spec| parse_item(spec, company.default_tax_rate))
        .collect::<ValidationResult<Vec<_>>>()?;

    let discount = match &args.discount {
        Some(raw) => parse_amount(raw, "discount")?,
        None => 0.0,
    };

    let validity_days = args.validity_days.unwrap_or(config.quotes.validity_days);
    validate_validity_days(validity_days)?;

    let taken = db.quotes().quote_numbers().await?;
    let number = generate_quote_number(|code| taken.contains(code))?;

    let mut quote = Quote::draft(number, client, today, validity_days);
    quote.items = items;
    quote.discount = discount;
    quote.notes = args.notes.as_deref().unwrap_or_default().trim().to_string();
    quote.payment_terms = args
        .terms
        .clone()
        .unwrap_or_else(|| config.quotes.default_payment_terms.clone());

    let totals = quote.recalculate_totals();
    validate_discount(discount, &totals)?;

    let saved = db.quotes().create(&quote).await?;
    info!(id = saved.id, quote_number = %saved.quote_number, total = saved.total_amount, "Quote created");
    Ok(saved)
}

/// Applies `changes` to a stored quote. Number, issue date and status are
/// kept; totals are recomputed and the discount checked before saving.
pub async fn edit(db: &Database, id: i64, changes: &EditQuoteArgs) -> AppResult<Quote> {
    let mut quote = find(db, id).await?;
    let company = db.company().get_or_default().await?;

    if let Some(client_id) = changes.client {
        quote.client = db
            .clients()
            .get_by_id(client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", client_id))?;
        quote.client_id = client_id;
    }

    apply_item_changes(&mut quote.items, changes, company.default_tax_rate)?;

    if let Some(raw) = &changes.discount {
        quote.discount = parse_amount(raw, "discount")?;
    }
    if let Some(notes) = &changes.notes {
        quote.notes = notes.trim().to_string();
    }
    if let Some(terms) = &changes.terms {
        quote.payment_terms = terms.trim().to_string();
    }
    if let Some(days) = changes.validity_days {
        validate_validity_days(days)?;
        quote.valid_until = quote.issue_date + Duration::days(days);
    }

    let totals = quote.recalculate_totals();
    validate_discount(quote.discount, &totals)?;

    db.quotes().update(&quote).await?;
    info!(id, items = quote.items.len(), total = quote.total_amount, "Quote updated");
    find(db, id).await
}

/// Copies a quote into a new draft issued `today`, valid for one month.
pub async fn duplicate(db: &Database, id: i64, today: NaiveDate) -> AppResult<Quote> {
    let source = find(db, id).await?;

    let taken = db.quotes().quote_numbers().await?;
    let number = generate_quote_number(|code| taken.contains(code))?;

    let mut copy = Quote::draft(number, source.client.clone(), today, 0);
    copy.valid_until = today
        .checked_add_months(Months::new(1))
        .unwrap_or(today + Duration::days(quill_core::DEFAULT_VALIDITY_DAYS));
    copy.notes = source.notes;
    copy.payment_terms = source.payment_terms;
    copy.discount = source.discount;
    copy.items = source.items;
    copy.recalculate_totals();

    let saved = db.quotes().create(&copy).await?;
    info!(source = id, id = saved.id, quote_number = %saved.quote_number, "Quote duplicated");
    Ok(saved)
}

/// Sets the status label. Any transition is accepted.
pub async fn set_status(db: &Database, id: i64, status: &str) -> AppResult<QuoteStatus> {
    let status: QuoteStatus = status.parse()?;
    db.quotes().update_status(id, status).await?;
    Ok(status)
}

/// Exports a stored quote to `output`, or to the dated default path in
/// the configured output directory.
pub async fn export(
    db: &Database,
    config: &AppConfig,
    id: i64,
    output: Option<PathBuf>,
) -> AppResult<ExportReport> {
    let quote = find(db, id).await?;
    let company = db.company().get_or_default().await?;

    let target = output.unwrap_or_else(|| default_export_path(config.output_dir(), &quote));
    let exporter = QuoteExporter::new(config.export_options());
    let report = exporter.export(&quote, &company, &target)?;

    info!(path = %report.path.display(), pages = report.total_pages(), "Quote exported");
    Ok(report)
}

async fn find(db: &Database, id: i64) -> AppResult<Quote> {
    db.quotes()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Quote", id))
}

// =============================================================================
// Item Parsing
// =============================================================================

/// Replaces, removes, then appends items. Line numbers are 1-based and
/// refer to `items` as passed in.
fn apply_item_changes(
    items: &mut Vec<QuoteItem>,
    changes: &EditQuoteArgs,
    default_rate: f64,
) -> ValidationResult<()> {
    let count = items.len();

    for spec in &changes.set_items {
        let (line, item) = spec.split_once(':').ok_or_else(|| ValidationError::InvalidFormat {
            field: "item".to_string(),
            reason: format!("expected \"N:description;quantity;unit price[;tax rate]\", got '{}'", spec),
        })?;
        let line = line.trim().parse().map_err(|_| ValidationError::InvalidFormat {
            field: "line".to_string(),
            reason: format!("'{}' is not a line number", line.trim()),
        })?;
        items[line_index(line, count)?] = parse_item(item, default_rate)?;
    }

    let mut removed = changes
        .remove_items
        .iter()
        .map(|&line| line_index(line, count))
        .collect::<ValidationResult<Vec<_>>>()?;
    removed.sort_unstable();
    removed.dedup();
    for index in removed.into_iter().rev() {
        items.remove(index);
    }

    for spec in &changes.add_items {
        items.push(parse_item(spec, default_rate)?);
    }
    Ok(())
}

fn line_index(line: usize, count: usize) -> ValidationResult<usize> {
    if (1..=count).contains(&line) {
        Ok(line - 1)
    } else {
        Err(ValidationError::OutOfRange {
            field: "line".to_string(),
            min: 1,
            max: count as i64,
        })
    }
}

/// Parses `"description;quantity;unit price[;tax rate]"`.
///
/// The tax rate falls back to `default_rate`. Numbers accept a decimal
/// comma.
pub fn parse_item(spec: &str, default_rate: f64) -> ValidationResult<QuoteItem> {
    let parts: Vec<&str> = spec.split(';').collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "item".to_string(),
            reason: format!("expected \"description;quantity;unit price[;tax rate]\", got '{}'", spec),
        });
    }

    let quantity = parse_amount(parts[1], "quantity")?;
    let unit_price = parse_amount(parts[2], "unit price")?;
    let tax_rate = match parts.get(3) {
        Some(raw) if !raw.trim().is_empty() => parse_amount(raw, "tax rate")?,
        _ => default_rate,
    };

    let item = QuoteItem::new(parts[0].trim(), quantity, unit_price, tax_rate);
    validate_item(&item)?;
    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================
