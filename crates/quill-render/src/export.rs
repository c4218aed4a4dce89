//! # Quote Export
//!
//! Renders a quote to PDF and, when a terms document exists, appends it.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rendered quote                                                         │
//! │       │                                                                 │
//! │       ├── terms absent  ─────────────────────────────┐                 │
//! │       │                                               ▼                 │
//! │       └── terms present ──► .tmpX ──► Merger ──► print_only ──► .tmpZ │
//! │                                         │                        │      │
//! │                         error: temp files deleted,     persist onto     │
//! │                         target never written           target          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scratch files live in the target directory so the final rename never
//! crosses filesystems. Both paths end in [`print_only`], so every written
//! document can be read and printed but not edited or copied.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use quill_core::{Company, Quote};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::canvas::LogoImage;
use crate::error::{ExportError, ExportResult, MergeError};
use crate::layout::render_quote;
use crate::merge::{page_count, Merger};
use crate::metrics::FontMetrics;
use crate::pdf::PdfCanvas;
use crate::protect::print_only;

/// Logo files looked up in the asset directory, in order.
pub const LOGO_FILE_NAMES: [&str; 3] = ["logo.jpg", "logo.jpeg", "logo.png"];

/// Default terms document name.
pub const DEFAULT_TERMS_FILE: &str = "cgv.pdf";

/// Where export looks for its inputs.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Terms document appended after the quote when it exists.
    pub terms_path: PathBuf,
    /// Directory searched for `logo.jpg`, `logo.jpeg`, `logo.png`.
    pub asset_dir: PathBuf,
    /// TrueType font for the regular face, and the bold face when
    /// `bold_font_path` is unset.
    pub font_path: Option<PathBuf>,
    /// TrueType font for the bold face.
    pub bold_font_path: Option<PathBuf>,
    /// Parent of the merge scratch directory; system temp dir when `None`.
    pub scratch_root: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            terms_path: PathBuf::from(DEFAULT_TERMS_FILE),
            asset_dir: PathBuf::from("."),
            font_path: None,
            bold_font_path: None,
            scratch_root: None,
        }
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub quote_pages: usize,
    /// Pages appended from the terms document; 0 when it was absent.
    pub terms_pages: usize,
}

impl ExportReport {
    pub fn total_pages(&self) -> usize {
        self.quote_pages + self.terms_pages
    }
}

/// Renders and writes quote documents.
#[derive(Debug, Clone, Default)]
pub struct QuoteExporter {
    options: ExportOptions,
}

impl QuoteExporter {
    pub fn new(options: ExportOptions) -> Self {
        QuoteExporter { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Writes the document for `quote` to `target`.
    ///
    /// Totals must already be current; they are printed as stored.
    ///
    /// ## Errors
    /// - `Render` when the font or the backend fails
    /// - `Merge` when the terms document exists but cannot be appended;
    ///   nothing is written to `target` in that case
    /// - `Protect` when the finished document cannot be encrypted
    /// - `Io` for scratch file or rename failures
    pub fn export(&self, quote: &Quote, company: &Company, target: &Path) -> ExportResult<ExportReport> {
        info!(quote_number = %quote.quote_number, target = %target.display(), "Exporting quote");

        let metrics = match &self.options.font_path {
            Some(path) => FontMetrics::load_ttf(path)?,
            None => FontMetrics::builtin(),
        };
        let metrics = match &self.options.bold_font_path {
            Some(path) => metrics.load_bold_ttf(path)?,
            None => metrics,
        };
        let logo = self.find_logo(company);

        let mut canvas = PdfCanvas::new(&quote.display_number(), metrics)?;
        render_quote(&mut canvas, quote, Some(company), logo.as_ref())?;
        let rendered = canvas.finish()?;

        let parent = target_dir(target);
        fs::create_dir_all(&parent)?;

        let terms = &self.options.terms_path;
        let terms_present = match fs::metadata(terms) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(MergeError::Unreadable {
                    path: terms.clone(),
                    source: e,
                }
                .into())
            }
        };

        let (document, terms_pages) = if terms_present {
            let mut quote_file = NamedTempFile::new_in(&parent)?;
            quote_file.write_all(&rendered.bytes)?;
            quote_file.flush()?;

            let merged_file = NamedTempFile::new_in(&parent)?;
            let merger = match &self.options.scratch_root {
                Some(root) => Merger::with_scratch_root(root),
                None => Merger::new(),
            };
            let total = merger.merge(quote_file.path(), terms, merged_file.path())?;
            (fs::read(merged_file.path())?, total.saturating_sub(rendered.pages))
        } else {
            debug!(terms = %terms.display(), "No terms document, writing quote alone");
            (rendered.bytes, 0)
        };

        let protected = print_only(&document)?;
        let mut final_file = NamedTempFile::new_in(&parent)?;
        final_file.write_all(&protected)?;
        final_file.flush()?;
        final_file.persist(target).map_err(|e| e.error)?;

        Ok(ExportReport {
            path: target.to_path_buf(),
            quote_pages: rendered.pages,
            terms_pages,
        })
    }

    /// First decodable logo file in the asset directory, else the
    /// company's stored logo.
    fn find_logo(&self, company: &Company) -> Option<LogoImage> {
        let from_file = LOGO_FILE_NAMES
            .iter()
            .map(|name| self.options.asset_dir.join(name))
            .find(|path| path.is_file())
            .and_then(|path| match fs::read(&path) {
                Ok(bytes) => decode_logo(&bytes, &path.display().to_string()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Logo unreadable, skipping");
                    None
                }
            });

        from_file.or_else(|| {
            company
                .logo
                .as_deref()
                .and_then(|bytes| decode_logo(bytes, "company profile"))
        })
    }
}

fn decode_logo(bytes: &[u8], source: &str) -> Option<LogoImage> {
    match LogoImage::from_bytes(bytes) {
        Ok(logo) => Some(logo),
        Err(e) => {
            warn!(source, error = %e, "Logo could not be decoded, skipping");
            None
        }
    }
}

fn target_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `{dir}/{year}_{month:02}_quote_{code}.pdf`, from the issue date.
pub fn default_export_path(dir: &Path, quote: &Quote) -> PathBuf {
    dir.join(format!(
        "{}_{:02}_quote_{}.pdf",
        quote.issue_date.year(),
        quote.issue_date.month(),
        quote.quote_number
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protect::tests::assert_print_only;
    use crate::test_support::write_fixture_pdf;
    use chrono::NaiveDate;
    use printpdf::image_crate::{DynamicImage, ImageOutputFormat};
    use quill_core::{Client, QuoteItem};
    use std::io::Cursor;

    struct Fixture {
        dir: tempfile::TempDir,
        scratch: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                dir: tempfile::tempdir().unwrap(),
                scratch: tempfile::tempdir().unwrap(),
            }
        }

        fn exporter(&self) -> QuoteExporter {
            QuoteExporter::new(ExportOptions {
                terms_path: self.dir.path().join("cgv.pdf"),
                asset_dir: self.dir.path().to_path_buf(),
                font_path: None,
                bold_font_path: None,
                scratch_root: Some(self.scratch.path().to_path_buf()),
            })
        }

        fn target(&self) -> PathBuf {
            self.dir.path().join("quotes").join("out.pdf")
        }

        fn scratch_is_empty(&self) -> bool {
            fs::read_dir(self.scratch.path()).unwrap().next().is_none()
        }

        /// Files left next to the target, the target itself included.
        fn output_dir_entries(&self) -> usize {
            fs::read_dir(self.dir.path().join("quotes"))
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    fn quote(items: usize) -> Quote {
        let issue = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut quote = Quote::draft("QWERTYUI", Client::new("Jane Doe"), issue, 30);
        for i in 0..items {
            quote.items.push(QuoteItem::new(format!("Item {i}"), 1.0, 100.0, 20.0));
        }
        quote.recalculate_totals();
        quote
    }

    fn company() -> Company {
        Company {
            name: "Quill Studio".to_string(),
            ..Company::default()
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_export_without_terms() {
        let fx = Fixture::new();
        let report = fx.exporter().export(&quote(2), &company(), &fx.target()).unwrap();

        assert_eq!(report.path, fx.target());
        assert_eq!(report.terms_pages, 0);
        assert_eq!(report.quote_pages, 1);
        assert_eq!(page_count(&fx.target()).unwrap(), 1);
        assert_eq!(fx.output_dir_entries(), 1);
        assert_print_only(&fs::read(fx.target()).unwrap());
    }

    #[test]
    fn test_export_appends_terms() {
        let fx = Fixture::new();
        write_fixture_pdf(&fx.dir.path().join("cgv.pdf"), 3);

        let report = fx.exporter().export(&quote(2), &company(), &fx.target()).unwrap();

        assert_eq!(report.terms_pages, 3);
        assert_eq!(page_count(&fx.target()).unwrap(), report.quote_pages + 3);
        assert_eq!(report.total_pages(), 4);
        assert!(fx.scratch_is_empty());
        assert_eq!(fx.output_dir_entries(), 1);
        assert_print_only(&fs::read(fx.target()).unwrap());
    }

    #[test]
    fn test_multi_page_quote_with_terms() {
        let fx = Fixture::new();
        write_fixture_pdf(&fx.dir.path().join("cgv.pdf"), 2);

        let report = fx.exporter().export(&quote(60), &company(), &fx.target()).unwrap();

        assert!(report.quote_pages >= 2);
        assert_eq!(page_count(&fx.target()).unwrap(), report.quote_pages + 2);
    }

    #[test]
    fn test_malformed_terms_leave_no_target() {
        let fx = Fixture::new();
        fs::write(fx.dir.path().join("cgv.pdf"), b"not a pdf at all").unwrap();

        let err = fx
            .exporter()
            .export(&quote(1), &company(), &fx.target())
            .unwrap_err();

        assert!(matches!(err, ExportError::Merge(_)), "{err:?}");
        assert!(!fx.target().exists());
        assert_eq!(fx.output_dir_entries(), 0);
        assert!(fx.scratch_is_empty());
    }

    #[test]
    fn test_terms_directory_is_a_merge_failure() {
        let fx = Fixture::new();
        fs::create_dir(fx.dir.path().join("cgv.pdf")).unwrap();

        let err = fx
            .exporter()
            .export(&quote(1), &company(), &fx.target())
            .unwrap_err();

        assert!(matches!(err, ExportError::Merge(_)));
        assert!(!fx.target().exists());
    }

    #[test]
    fn test_logo_lookup_order() {
        let fx = Fixture::new();
        let exporter = fx.exporter();

        let mut company = company();
        company.logo = Some(png_bytes(10, 20));
        let logo = exporter.find_logo(&company).unwrap();
        assert_eq!(logo.pixel_size().width, 10.0);

        fs::write(fx.dir.path().join("logo.png"), png_bytes(30, 10)).unwrap();
        let logo = exporter.find_logo(&company).unwrap();
        assert_eq!(logo.pixel_size().width, 30.0);

        // An undecodable file falls through to the stored logo.
        fs::write(fx.dir.path().join("logo.jpg"), b"garbage").unwrap();
        let logo = exporter.find_logo(&company).unwrap();
        assert_eq!(logo.pixel_size().width, 10.0);

        company.logo = None;
        assert!(exporter.find_logo(&company).is_none());
    }

    #[test]
    fn test_export_with_logo() {
        let fx = Fixture::new();
        fs::write(fx.dir.path().join("logo.png"), png_bytes(80, 40)).unwrap();

        let report = fx.exporter().export(&quote(1), &company(), &fx.target()).unwrap();
        assert_eq!(report.quote_pages, 1);
    }

    #[test]
    fn test_missing_font_is_a_render_error() {
        let fx = Fixture::new();
        let mut options = fx.exporter().options().clone();
        options.font_path = Some(fx.dir.path().join("missing.ttf"));

        let err = QuoteExporter::new(options.clone())
            .export(&quote(1), &company(), &fx.target())
            .unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
        assert!(!fx.target().exists());

        options.font_path = None;
        options.bold_font_path = Some(fx.dir.path().join("missing-bold.ttf"));
        let err = QuoteExporter::new(options)
            .export(&quote(1), &company(), &fx.target())
            .unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
        assert!(!fx.target().exists());
    }

    #[test]
    fn test_default_export_path() {
        let path = default_export_path(Path::new("quotes"), &quote(0));
        assert_eq!(path, PathBuf::from("quotes/2026_10_quote_QWERTYUI.pdf"));

        let mut early = quote(0);
        early.issue_date = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
        assert_eq!(
            default_export_path(Path::new("out"), &early),
            PathBuf::from("out/2027_03_quote_QWERTYUI.pdf")
        );
    }
}
