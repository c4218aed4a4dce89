//! # quill-render: Quote Documents
//!
//! Turns a quote and the company profile into a paginated PDF, then
//! appends the terms document when one exists.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Export Pipeline                                  │
//! │                                                                         │
//! │  Quote + Company + logo                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  layout::render_quote ──► Canvas trait ──► PdfCanvas (printpdf)        │
//! │       │                                     │ paginates rows           │
//! │       ▼                                     ▼                           │
//! │  PDF bytes (in memory)                                                 │
//! │       │                                                                 │
//! │       ├── terms absent  ───────────────────────┐                       │
//! │       │                                         ▼                       │
//! │       └── terms present ──► merge::Merger ──► protect::print_only      │
//! │                             (lopdf, TempDir)    │                       │
//! │                                                 ▼                       │
//! │                                   scratch file ──► persist to target   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either a complete document lands at the target or nothing does.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod canvas;
pub mod error;
pub mod export;
pub mod layout;
pub mod merge;
pub mod metrics;
pub mod pdf;
pub mod protect;

// =============================================================================
// Re-exports
// =============================================================================

pub use canvas::{Align, Canvas, Cell, Font, FontFace, Frame, LogoImage, Point};
pub use error::{ExportError, ExportResult, MergeError, MergeResult, RenderError, RenderResult};
pub use export::{default_export_path, ExportOptions, ExportReport, QuoteExporter};
pub use layout::render_quote;
pub use merge::{page_count, Merger};
pub use metrics::FontMetrics;
pub use pdf::{PdfCanvas, RenderedDocument};
pub use protect::print_only;

// =============================================================================
// Page Geometry (millimetres, A4 portrait)
// =============================================================================

/// Page width.
pub const PAGE_WIDTH: f32 = 210.0;

/// Page height.
pub const PAGE_HEIGHT: f32 = 297.0;

/// Margin on every side.
pub const PAGE_MARGIN: f32 = 15.0;

/// Usable width between the side margins.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * PAGE_MARGIN;

/// Points to millimetres.
pub(crate) const PT_TO_MM: f32 = 25.4 / 72.0;

#[cfg(test)]
pub(crate) mod test_support {
    use printpdf::{BuiltinFont, Mm, PdfDocument};
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    /// Writes a PDF with `pages` pages, each labelled with its number.
    pub fn write_fixture_pdf(path: &Path, pages: usize) {
        let (doc, page, layer) = PdfDocument::new("fixture", Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
        doc.get_page(page)
            .get_layer(layer)
            .use_text("page 1", 12.0, Mm(20.0), Mm(270.0), &font);

        for n in 2..=pages {
            let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
            doc.get_page(page)
                .get_layer(layer)
                .use_text(format!("page {n}"), 12.0, Mm(20.0), Mm(270.0), &font);
        }

        let mut writer = BufWriter::new(File::create(path).unwrap());
        doc.save(&mut writer).unwrap();
    }
}
