//! # PDF Backend
//!
//! The single [`Canvas`] implementation, drawing through printpdf.
//!
//! ## Coordinates
//! ```text
//! Canvas space (layout)          printpdf space
//! origin top-left, y down   →    origin bottom-left, y up
//! y_canvas                       y_pdf = PAGE_HEIGHT - y_canvas
//! ```
//!
//! ## Pagination
//! Before drawing a row the canvas checks whether `cursor + height`
//! crosses the bottom margin. If so it opens a new page and resets the
//! cursor to the top margin. A row taller than a whole page is drawn
//! anyway rather than looping on empty pages.
//!
//! ## Bold Faces
//! Builtin output uses Helvetica-Bold. An external font is embedded once
//! per face; without a separate bold file, bold text is the regular face
//! drawn with fill and a thin stroke.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rect, Rgb, TextRenderingMode,
};
use std::io::{BufWriter, Cursor};
use tracing::debug;

use crate::canvas::{Align, Canvas, Cell, Font, FontFace, Frame, LogoImage, Point, CELL_PADDING};
use crate::error::{RenderError, RenderResult};
use crate::metrics::FontMetrics;
use crate::{CONTENT_WIDTH, PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH, PT_TO_MM};

/// Resolution images are placed at before scaling.
const IMAGE_DPI: f32 = 300.0;

const LAYER_NAME: &str = "Layer 1";

const SHADE_GRAY: f32 = 0.9;
const RULE_THICKNESS: f32 = 0.3;

/// Outline width, in points, of emboldened text.
const SYNTHETIC_BOLD_STROKE: f32 = 0.4;

/// Serialized output of a finished canvas.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// A4 portrait PDF canvas.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
    synthetic_bold: bool,
    metrics: FontMetrics,
    cursor: f32,
    pages: usize,
}

impl PdfCanvas {
    /// Opens a one-page document, embedding the external fonts configured
    /// in `metrics`.
    pub fn new(title: &str, metrics: FontMetrics) -> RenderResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let layer = doc.get_page(page).get_layer(layer);

        let regular = match metrics.external_font() {
            Some(bytes) => external(&doc, bytes)?,
            None => builtin(&doc, BuiltinFont::Helvetica)?,
        };
        let bold = match (metrics.external_bold_font(), metrics.bold_is_synthetic()) {
            (Some(bytes), _) => external(&doc, bytes)?,
            (None, true) => regular.clone(),
            (None, false) => builtin(&doc, BuiltinFont::HelveticaBold)?,
        };
        let mono = builtin(&doc, BuiltinFont::Courier)?;

        Ok(PdfCanvas {
            doc,
            layer,
            regular,
            bold,
            mono,
            synthetic_bold: metrics.bold_is_synthetic(),
            metrics,
            cursor: PAGE_MARGIN,
            pages: 1,
        })
    }

    /// Number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Serializes the document.
    pub fn finish(self) -> RenderResult<RenderedDocument> {
        let pages = self.pages;
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        debug!(pages, bytes = bytes.len(), "PDF serialized");
        Ok(RenderedDocument { bytes, pages })
    }

    fn font_ref(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Mono => &self.mono,
        }
    }

    /// Starts a new page when a block of `height` would cross the bottom
    /// margin.
    fn ensure_space(&mut self, height: f32) {
        let bottom = PAGE_HEIGHT - PAGE_MARGIN;
        if self.cursor + height > bottom && self.cursor > PAGE_MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor = PAGE_MARGIN;
            self.pages += 1;
            debug!(page = self.pages, "Page break");
        }
    }

    /// Baseline that vertically centres one line of `font` in a band.
    fn baseline(top: f32, band: f32, font: Font) -> f32 {
        top + band / 2.0 + 0.35 * font.size * PT_TO_MM
    }

    fn draw_text(&self, text: &str, font: Font, x: f32, baseline: f32) {
        if text.is_empty() {
            return;
        }
        let mode = rendering_mode(font.face, self.synthetic_bold);
        let stroked = !matches!(mode, TextRenderingMode::Fill);
        if stroked {
            self.layer.set_text_rendering_mode(mode);
            self.layer.set_outline_thickness(SYNTHETIC_BOLD_STROKE);
        }
        self.layer.use_text(
            text,
            font.size,
            Mm(x),
            Mm(PAGE_HEIGHT - baseline),
            self.font_ref(font.face),
        );
        if stroked {
            self.layer.set_text_rendering_mode(TextRenderingMode::Fill);
            self.layer.set_outline_thickness(RULE_THICKNESS);
        }
    }

    fn draw_cells(&self, cells: &[Cell], top: f32, height: f32) {
        let mut x = PAGE_MARGIN;
        for cell in cells {
            let text_x = match cell.align {
                Align::Left => x + CELL_PADDING,
                Align::Right => {
                    x + cell.width - CELL_PADDING - self.metrics.text_width(&cell.text, cell.font)
                }
            };
            self.draw_text(&cell.text, cell.font, text_x, Self::baseline(top, height, cell.font));
            x += cell.width;
        }
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32, mode: PaintMode) {
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT - top - height),
            Mm(x + width),
            Mm(PAGE_HEIGHT - top),
        )
        .with_mode(mode);
        self.layer.add_rect(rect);
    }
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> RenderResult<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Backend(e.to_string()))
}

fn external(doc: &PdfDocumentReference, bytes: &[u8]) -> RenderResult<IndirectFontRef> {
    doc.add_external_font(Cursor::new(bytes.to_vec()))
        .map_err(|e| RenderError::Backend(e.to_string()))
}

/// Fill only, except bold text that has no face of its own.
fn rendering_mode(face: FontFace, synthetic_bold: bool) -> TextRenderingMode {
    match face {
        FontFace::Bold if synthetic_bold => TextRenderingMode::FillStroke,
        _ => TextRenderingMode::Fill,
    }
}

impl Canvas for PdfCanvas {
    fn content_width(&self) -> f32 {
        CONTENT_WIDTH
    }

    fn text_width(&self, text: &str, font: Font) -> f32 {
        self.metrics.text_width(text, font)
    }

    fn text_row(&mut self, cells: &[Cell], height: f32) -> RenderResult<()> {
        self.ensure_space(height);
        self.draw_cells(cells, self.cursor, height);
        self.cursor += height;
        Ok(())
    }

    fn paragraph(&mut self, text: &str, font: Font, line_height: f32) -> RenderResult<()> {
        let width = CONTENT_WIDTH - 2.0 * CELL_PADDING;
        for line in self.wrap_text(text, font, width) {
            self.ensure_space(line_height);
            let baseline = Self::baseline(self.cursor, line_height, font);
            self.draw_text(&line, font, PAGE_MARGIN + CELL_PADDING, baseline);
            self.cursor += line_height;
        }
        Ok(())
    }

    fn ruled_row(&mut self, cells: &[Cell], height: f32, shaded: bool) -> RenderResult<Point> {
        self.ensure_space(height);
        let top = self.cursor;
        let width: f32 = cells.iter().map(|c| c.width).sum();

        if shaded {
            self.layer
                .set_fill_color(Color::Rgb(Rgb::new(SHADE_GRAY, SHADE_GRAY, SHADE_GRAY, None)));
            self.rect(PAGE_MARGIN, top, width, height, PaintMode::Fill);
            self.layer
                .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        }

        self.layer.set_outline_thickness(RULE_THICKNESS);
        let mut x = PAGE_MARGIN;
        for cell in cells {
            self.rect(x, top, cell.width, height, PaintMode::Stroke);
            x += cell.width;
        }

        self.draw_cells(cells, top, height);
        self.cursor += height;

        Ok(Point {
            x: PAGE_MARGIN,
            y: top,
        })
    }

    fn text_lines_at(
        &mut self,
        origin: Point,
        lines: &[String],
        font: Font,
        line_height: f32,
    ) -> RenderResult<()> {
        for (i, line) in lines.iter().enumerate() {
            let top = origin.y + i as f32 * line_height;
            self.draw_text(line, font, origin.x + CELL_PADDING, Self::baseline(top, line_height, font));
        }
        Ok(())
    }

    fn image(&mut self, image: &LogoImage, frame: Frame) -> RenderResult<()> {
        let px = image.pixel_size();
        if px.is_degenerate() || frame.width <= 0.0 || frame.height <= 0.0 {
            return Ok(());
        }

        // Natural size at IMAGE_DPI, then scaled to the frame.
        let natural_w = px.width / IMAGE_DPI * 25.4;
        let natural_h = px.height / IMAGE_DPI * 25.4;

        Image::from_dynamic_image(image.image()).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(frame.x)),
                translate_y: Some(Mm(PAGE_HEIGHT - frame.y - frame.height)),
                rotate: None,
                scale_x: Some(frame.width / natural_w),
                scale_y: Some(frame.height / natural_h),
                dpi: Some(IMAGE_DPI),
            },
        );
        Ok(())
    }

    fn gap(&mut self, height: f32) {
        self.cursor += height;
    }
}
