//! # Quote Layout
//!
//! Lays a quote out as seven self-contained sections, top to bottom:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ 1. Company header                 ┌────────┐ │
//! │                                   │  logo  │ │  35 × 25 mm box,
//! │ 2. QUOTE  2026-10-QWERTYUI        └────────┘ │  top-right
//! │ 3. Date ............ Valid until ...........  │
//! │ 4. CLIENT block                              │
//! │ 5. ┌──────────────┬────┬──────┬────┬───────┐ │
//! │    │ Description  │Qty │Price │Tax │Amount │ │  80:20:30:20:40
//! │    └──────────────┴────┴──────┴────┴───────┘ │
//! │ 6.                       Subtotal ....       │
//! │                          TOTAL ....          │
//! │ 7. Notes / Payment terms                     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The layout never decides page breaks; the canvas does. Rendering reads
//! the stored totals of the quote and does not recompute them.

use quill_core::{
    fit_within, format_amount, format_date, format_quantity, format_rate, Company, Quote,
    QuoteItem, Size, DEFAULT_CURRENCY,
};
use tracing::{debug, warn};

use crate::canvas::{Canvas, Cell, Font, Frame, LogoImage, Point, CELL_PADDING};
use crate::error::RenderResult;
use crate::PAGE_MARGIN;

// =============================================================================
// Layout Constants (millimetres / points)
// =============================================================================

/// Logo bounding box.
pub const LOGO_BOX: Size = Size::new(35.0, 25.0);

/// Item table column proportions: description, quantity, unit price, tax, amount.
const COLUMN_PROPORTIONS: [f32; 5] = [80.0, 20.0, 30.0, 20.0, 40.0];

/// Totals block proportions: spacer, label, value.
const TOTALS_PROPORTIONS: [f32; 3] = [115.0, 40.0, 35.0];

/// Reference width the proportions above add up to.
const PROPORTION_BASE: f32 = 190.0;

const LINE: f32 = 5.0;
const MIN_ROW_HEIGHT: f32 = 8.0;

const COMPANY_NAME: Font = Font::bold(16.0);
const BODY: Font = Font::regular(10.0);
const TITLE: Font = Font::bold(20.0);
const NUMBER: Font = Font::mono(12.0);
const SECTION_LABEL: Font = Font::bold(12.0);
const TABLE_HEADER: Font = Font::bold(10.0);
const ITEM: Font = Font::regular(9.0);
const GRAND_TOTAL: Font = Font::bold(12.0);
const REMARK_LABEL: Font = Font::bold(10.0);
const REMARK: Font = Font::regular(9.0);

/// Smallest size a numeric cell is shrunk to.
const MIN_FIT_SIZE: f32 = 5.0;

// =============================================================================
// Entry Point
// =============================================================================

/// Draws `quote` onto `canvas`.
///
/// `company` supplies the header and currency; without it the header is
/// empty and amounts use the default currency. `logo` is fitted into
/// [`LOGO_BOX`] at the top-right corner of the first page, independent of
/// the header text.
pub fn render_quote<C: Canvas + ?Sized>(
    canvas: &mut C,
    quote: &Quote,
    company: Option<&Company>,
    logo: Option<&LogoImage>,
) -> RenderResult<()> {
    debug!(quote_number = %quote.quote_number, items = quote.items.len(), "Rendering quote");

    let currency = company.map_or(DEFAULT_CURRENCY, Company::currency);

    if let Some(logo) = logo {
        draw_logo(canvas, logo)?;
    }
    if let Some(company) = company {
        draw_company(canvas, company)?;
    }
    draw_title(canvas, quote)?;
    draw_dates(canvas, quote)?;
    draw_client(canvas, quote)?;
    draw_items(canvas, &quote.items, currency)?;
    draw_totals(canvas, quote, currency)?;
    draw_remark(canvas, "Notes", &quote.notes)?;
    draw_remark(canvas, "Payment terms", &quote.payment_terms)?;

    Ok(())
}

// =============================================================================
// Sections
// =============================================================================

fn draw_logo<C: Canvas + ?Sized>(canvas: &mut C, logo: &LogoImage) -> RenderResult<()> {
    let fitted = fit_within(logo.pixel_size(), LOGO_BOX);
    if fitted.is_degenerate() {
        warn!("Logo has no usable dimensions, skipping");
        return Ok(());
    }

    let frame = Frame {
        x: PAGE_MARGIN + canvas.content_width() - fitted.width,
        y: PAGE_MARGIN,
        width: fitted.width,
        height: fitted.height,
    };
    canvas.image(logo, frame)
}

fn draw_company<C: Canvas + ?Sized>(canvas: &mut C, company: &Company) -> RenderResult<()> {
    let width = canvas.content_width();

    let name = company.name.trim();
    if !name.is_empty() {
        canvas.text_row(&[Cell::new(name, width, COMPANY_NAME)], 8.0)?;
    }

    let lines = [
        company.address.trim().to_string(),
        postal_city(&company.postal_code, &company.city),
        labelled("Tel", &company.phone),
        labelled("Email", &company.email),
        labelled("VAT", &company.tax_id),
    ];
    for line in lines.iter().filter(|l| !l.is_empty()) {
        canvas.text_row(&[Cell::new(line.as_str(), width, BODY)], LINE)?;
    }

    Ok(())
}

fn draw_title<C: Canvas + ?Sized>(canvas: &mut C, quote: &Quote) -> RenderResult<()> {
    let width = canvas.content_width();

    canvas.gap(10.0);
    canvas.text_row(&[Cell::new("QUOTE", width, TITLE)], 10.0)?;
    canvas.text_row(&[Cell::new(quote.display_number(), width, NUMBER)], LINE)?;
    canvas.gap(5.0);
    Ok(())
}

fn draw_dates<C: Canvas + ?Sized>(canvas: &mut C, quote: &Quote) -> RenderResult<()> {
    let half = canvas.content_width() / 2.0;

    canvas.text_row(
        &[
            Cell::new(format!("Date: {}", format_date(quote.issue_date)), half, BODY),
            Cell::new(format!("Valid until: {}", format_date(quote.valid_until)), half, BODY),
        ],
        LINE,
    )?;
    canvas.gap(5.0);
    Ok(())
}

fn draw_client<C: Canvas + ?Sized>(canvas: &mut C, quote: &Quote) -> RenderResult<()> {
    let width = canvas.content_width();
    let client = &quote.client;

    canvas.text_row(&[Cell::new("CLIENT", width, SECTION_LABEL)], LINE)?;

    let lines = [
        client.name.trim().to_string(),
        client.distinct_company().unwrap_or_default().to_string(),
        client.address.trim().to_string(),
        postal_city(&client.postal_code, &client.city),
        labelled("VAT", &client.tax_id),
    ];
    for line in lines.iter().filter(|l| !l.is_empty()) {
        canvas.text_row(&[Cell::new(line.as_str(), width, BODY)], LINE)?;
    }

    canvas.gap(10.0);
    Ok(())
}

fn draw_items<C: Canvas + ?Sized>(
    canvas: &mut C,
    items: &[QuoteItem],
    currency: &str,
) -> RenderResult<()> {
    let widths = scaled(COLUMN_PROPORTIONS, canvas.content_width());

    canvas.ruled_row(
        &[
            Cell::new("Description", widths[0], TABLE_HEADER),
            Cell::new("Qty", widths[1], TABLE_HEADER).right(),
            Cell::new("Unit price", widths[2], TABLE_HEADER).right(),
            Cell::new("Tax", widths[3], TABLE_HEADER).right(),
            Cell::new("Amount", widths[4], TABLE_HEADER).right(),
        ],
        MIN_ROW_HEIGHT,
        true,
    )?;

    for item in items {
        let lines = canvas.wrap_text(&item.description, ITEM, widths[0] - 2.0 * CELL_PADDING);
        let height = row_height(lines.len());

        // Borders and numbers first; the description goes on top, at
        // wherever the row actually landed.
        let cells = [
            Cell::new("", widths[0], ITEM),
            fitted_cell(canvas, format_quantity(item.quantity), widths[1], ITEM),
            fitted_cell(canvas, format_amount(item.unit_price, currency), widths[2], ITEM),
            fitted_cell(canvas, format_rate(item.tax_rate), widths[3], ITEM),
            fitted_cell(canvas, format_amount(item.amount, currency), widths[4], ITEM),
        ];
        let origin = canvas.ruled_row(&cells, height, false)?;

        let text_height = lines.len() as f32 * LINE;
        let top = origin.y + (height - text_height) / 2.0;
        canvas.text_lines_at(Point { x: origin.x, y: top }, &lines, ITEM, LINE)?;
    }

    canvas.gap(5.0);
    Ok(())
}

fn draw_totals<C: Canvas + ?Sized>(canvas: &mut C, quote: &Quote, currency: &str) -> RenderResult<()> {
    let [spacer, label, value] = scaled(TOTALS_PROPORTIONS, canvas.content_width());

    let mut rows = vec![("Subtotal", format_amount(quote.subtotal(), currency))];
    if quote.discount > 0.0 {
        rows.push(("Discount", format!("-{}", format_amount(quote.discount, currency))));
    }
    rows.push(("Tax", format_amount(quote.tax_amount, currency)));

    for (text, amount) in rows {
        let cells = [
            Cell::spacer(spacer),
            Cell::new(text, label, BODY),
            fitted_cell(canvas, amount, value, BODY),
        ];
        canvas.text_row(&cells, LINE)?;
    }

    let cells = [
        Cell::spacer(spacer),
        Cell::new("TOTAL", label, GRAND_TOTAL),
        fitted_cell(canvas, format_amount(quote.total_amount, currency), value, GRAND_TOTAL),
    ];
    canvas.text_row(&cells, 7.0)?;

    canvas.gap(15.0);
    Ok(())
}

fn draw_remark<C: Canvas + ?Sized>(canvas: &mut C, label: &str, text: &str) -> RenderResult<()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }

    let width = canvas.content_width();
    canvas.text_row(&[Cell::new(label, width, REMARK_LABEL)], LINE)?;
    canvas.paragraph(text, REMARK, LINE)?;
    canvas.gap(5.0);
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Height of an item row holding `lines` description lines.
fn row_height(lines: usize) -> f32 {
    (lines as f32 * LINE).max(MIN_ROW_HEIGHT)
}

/// Right-aligned cell whose font is shrunk until `text` fits between the
/// paddings, down to [`MIN_FIT_SIZE`].
fn fitted_cell<C: Canvas + ?Sized>(canvas: &C, text: String, width: f32, font: Font) -> Cell {
    let available = width - 2.0 * CELL_PADDING;
    let measured = canvas.text_width(&text, font);

    let font = if measured > available && measured > 0.0 {
        Font {
            size: (font.size * available / measured).max(MIN_FIT_SIZE),
            ..font
        }
    } else {
        font
    };
    Cell::new(text, width, font).right()
}

fn scaled<const N: usize>(proportions: [f32; N], width: f32) -> [f32; N] {
    proportions.map(|p| p * width / PROPORTION_BASE)
}

fn postal_city(postal_code: &str, city: &str) -> String {
    format!("{} {}", postal_code.trim(), city.trim()).trim().to_string()
}

fn labelled(label: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        String::new()
    } else {
        format!("{label}: {value}")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
