//! # Drawing Capability
//!
//! The layout engine draws only through [`Canvas`]. Coordinates are
//! millimetres with the origin at the top-left corner of the page and y
//! growing downwards. The canvas owns a vertical cursor: row operations
//! draw at the cursor and advance it, moving to a new page first when the
//! row would cross the bottom margin.
//!
//! ```text
//!  (0,0) ┌──────────────────────────────┐
//!        │  margin                      │
//!        │   ┌──────────────────────┐   │
//!        │   │ text_row / paragraph │   │ ← cursor advances downwards
//!        │   ├──────┬──────┬────────┤   │
//!        │   │ruled_row cells       │   │
//!        │   └──────┴──────┴────────┘   │
//!        │                              │
//!        └──────────────────────────────┘ (210,297)
//! ```

use printpdf::image_crate::{self, DynamicImage};
use quill_core::Size;

use crate::error::{RenderError, RenderResult};

/// Horizontal inset of text inside a cell, in millimetres.
pub const CELL_PADDING: f32 = 1.5;

// =============================================================================
// Primitive Types
// =============================================================================

/// Typeface family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Mono,
}

/// Face plus size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub face: FontFace,
    pub size: f32,
}

impl Font {
    pub const fn regular(size: f32) -> Self {
        Font {
            face: FontFace::Regular,
            size,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Font {
            face: FontFace::Bold,
            size,
        }
    }

    pub const fn mono(size: f32) -> Self {
        Font {
            face: FontFace::Mono,
            size,
        }
    }
}

/// Horizontal alignment of text inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// A position on the current page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A rectangle on the current page, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One cell of a row. Cells are laid out left to right from the left
/// margin, each taking `width` millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub width: f32,
    pub font: Font,
    pub align: Align,
}

impl Cell {
    pub fn new(text: impl Into<String>, width: f32, font: Font) -> Self {
        Cell {
            text: text.into(),
            width,
            font,
            align: Align::Left,
        }
    }

    /// Same cell, right-aligned.
    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    /// An empty cell that only takes up space.
    pub fn spacer(width: f32) -> Self {
        Cell::new("", width, Font::regular(10.0))
    }
}

/// A decoded raster logo.
#[derive(Debug, Clone)]
pub struct LogoImage {
    image: DynamicImage,
}

impl LogoImage {
    /// Decodes PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> RenderResult<Self> {
        let image =
            image_crate::load_from_memory(bytes).map_err(|e| RenderError::Image(e.to_string()))?;
        Ok(LogoImage { image })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        LogoImage { image }
    }

    /// Pixel dimensions, used as the intrinsic size for fitting.
    pub fn pixel_size(&self) -> Size {
        Size::new(self.image.width() as f32, self.image.height() as f32)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

// =============================================================================
// Canvas Trait
// =============================================================================

/// Everything the layout engine needs from a drawing backend.
pub trait Canvas {
    /// Width between the side margins.
    fn content_width(&self) -> f32;

    /// Rendered width of `text` in millimetres.
    fn text_width(&self, text: &str, font: Font) -> f32;

    /// Draws unbordered cells side by side on one line of `height` mm.
    fn text_row(&mut self, cells: &[Cell], height: f32) -> RenderResult<()>;

    /// Draws `text` wrapped to the content width, one line per `line_height`.
    fn paragraph(&mut self, text: &str, font: Font, line_height: f32) -> RenderResult<()>;

    /// Draws bordered cells sharing `height`, optionally shaded, and
    /// returns the top-left corner of the row as placed (possibly on a
    /// new page).
    fn ruled_row(&mut self, cells: &[Cell], height: f32, shaded: bool) -> RenderResult<Point>;

    /// Draws `lines` starting at `origin` without moving the cursor.
    fn text_lines_at(
        &mut self,
        origin: Point,
        lines: &[String],
        font: Font,
        line_height: f32,
    ) -> RenderResult<()>;

    /// Places an image on the current page without moving the cursor.
    fn image(&mut self, image: &LogoImage, frame: Frame) -> RenderResult<()>;

    /// Advances the cursor by `height` mm.
    fn gap(&mut self, height: f32);

    /// Greedy word wrap to `max_width` mm. Explicit newlines are kept and
    /// a word wider than a whole line is split between characters.
    fn wrap_text(&self, text: &str, font: Font, max_width: f32) -> Vec<String> {
        let mut out = Vec::new();

        for paragraph in text.trim().lines() {
            let mut current = String::new();

            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };

                if self.text_width(&candidate, font) <= max_width {
                    current = candidate;
                    continue;
                }

                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }

                if self.text_width(word, font) <= max_width {
                    current.push_str(word);
                    continue;
                }

                let mut chunk = String::new();
                for ch in word.chars() {
                    chunk.push(ch);
                    if self.text_width(&chunk, font) > max_width && chunk.chars().count() > 1 {
                        chunk.pop();
                        out.push(std::mem::take(&mut chunk));
                        chunk.push(ch);
                    }
                }
                current = chunk;
            }

            // Blank source lines are kept as blank output lines.
            out.push(current);
        }

        while out.last().is_some_and(|line| line.is_empty()) {
            out.pop();
        }

        out
    }
}
