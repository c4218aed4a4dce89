//! # Text Metrics
//!
//! Widths of the three builtin PDF faces come from the standard AFM
//! tables (units per 1000 em). An external TrueType font replaces the
//! regular face, and the bold face too unless a separate bold font is
//! given. External faces are measured from their own glyph advances.
//!
//! Characters outside printable ASCII fall back to an average glyph width
//! for the builtin faces.

use std::path::Path;
use std::sync::Arc;

use crate::canvas::{Font, FontFace};
use crate::error::{RenderError, RenderResult};
use crate::PT_TO_MM;

/// Helvetica advances for ASCII 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold advances for ASCII 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a-m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n-z
    389, 280, 389, 584, // {..~
];

const COURIER_ADVANCE: u16 = 600;
const REGULAR_FALLBACK: u16 = 556;
const BOLD_FALLBACK: u16 = 611;

/// Measures text in millimetres for a given [`Font`].
#[derive(Debug, Clone, Default)]
pub struct FontMetrics {
    /// Raw bytes of the external font, already validated as parseable.
    external: Option<Arc<[u8]>>,
    /// Separate bold font, validated the same way.
    external_bold: Option<Arc<[u8]>>,
}

impl FontMetrics {
    /// Metrics for the builtin Helvetica / Helvetica-Bold / Courier faces.
    pub fn builtin() -> Self {
        FontMetrics::default()
    }

    /// Metrics backed by a TrueType font for the regular and bold faces.
    pub fn from_ttf(bytes: Vec<u8>) -> RenderResult<Self> {
        Ok(FontMetrics {
            external: Some(validated(bytes)?),
            external_bold: None,
        })
    }

    /// Reads and validates a TrueType font file.
    pub fn load_ttf(path: &Path) -> RenderResult<Self> {
        Self::from_ttf(read_font(path)?).map_err(|e| at_path(e, path))
    }

    /// Uses `bytes` for the bold face.
    pub fn with_bold_ttf(self, bytes: Vec<u8>) -> RenderResult<Self> {
        Ok(FontMetrics {
            external_bold: Some(validated(bytes)?),
            ..self
        })
    }

    /// Reads and validates a TrueType font file for the bold face.
    pub fn load_bold_ttf(self, path: &Path) -> RenderResult<Self> {
        self.with_bold_ttf(read_font(path)?).map_err(|e| at_path(e, path))
    }

    /// Bytes of the external font, if one is configured.
    pub fn external_font(&self) -> Option<&[u8]> {
        self.external.as_deref()
    }

    /// Bytes of the separate bold font, if one is configured.
    pub fn external_bold_font(&self) -> Option<&[u8]> {
        self.external_bold.as_deref()
    }

    /// Bold text has to be emboldened by stroking: an external regular
    /// font is set without a matching bold one.
    pub fn bold_is_synthetic(&self) -> bool {
        self.external.is_some() && self.external_bold.is_none()
    }

    /// Width of `text` set in `font`, in millimetres.
    pub fn text_width(&self, text: &str, font: Font) -> f32 {
        let external = match font.face {
            FontFace::Regular => self.external.as_deref(),
            FontFace::Bold => self.external_bold.as_deref().or(self.external.as_deref()),
            FontFace::Mono => None,
        };
        match external.map(|bytes| ttf_parser::Face::parse(bytes, 0)) {
            Some(Ok(face)) => ttf_width_mm(&face, text, font.size),
            _ => builtin_width_mm(text, font),
        }
    }
}

fn validated(bytes: Vec<u8>) -> RenderResult<Arc<[u8]>> {
    ttf_parser::Face::parse(&bytes, 0).map_err(|e| RenderError::Font {
        path: "<memory>".into(),
        reason: e.to_string(),
    })?;
    Ok(Arc::from(bytes))
}

fn read_font(path: &Path) -> RenderResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| RenderError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Replaces the placeholder path of a parse error with the file's path.
fn at_path(err: RenderError, path: &Path) -> RenderError {
    match err {
        RenderError::Font { reason, .. } => RenderError::Font {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    }
}

fn builtin_width_mm(text: &str, font: Font) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| u32::from(builtin_advance(ch, font.face)))
        .sum();
    units as f32 / 1000.0 * font.size * PT_TO_MM
}

fn builtin_advance(ch: char, face: FontFace) -> u16 {
    let index = (ch as u32).checked_sub(32).map(|i| i as usize);
    match face {
        FontFace::Mono => COURIER_ADVANCE,
        FontFace::Regular => index
            .and_then(|i| HELVETICA.get(i).copied())
            .unwrap_or(REGULAR_FALLBACK),
        FontFace::Bold => index
            .and_then(|i| HELVETICA_BOLD.get(i).copied())
            .unwrap_or(BOLD_FALLBACK),
    }
}

fn ttf_width_mm(face: &ttf_parser::Face<'_>, text: &str, size_pt: f32) -> f32 {
    let units_per_em = face.units_per_em() as f32;
    if units_per_em <= 0.0 {
        return 0.0;
    }

    let units: u32 = text
        .chars()
        .filter_map(|ch| face.glyph_index(ch))
        .map(|gid| u32::from(face.glyph_hor_advance(gid).unwrap_or(0)))
        .sum();

    units as f32 / units_per_em * size_pt * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_table_lookups() {
        assert_eq!(builtin_advance(' ', FontFace::Regular), 278);
        assert_eq!(builtin_advance('@', FontFace::Regular), 1015);
        assert_eq!(builtin_advance('W', FontFace::Regular), 944);
        assert_eq!(builtin_advance('i', FontFace::Regular), 222);
        assert_eq!(builtin_advance('~', FontFace::Regular), 584);
        assert_eq!(builtin_advance('i', FontFace::Bold), 278);
        assert_eq!(builtin_advance('z', FontFace::Bold), 500);
        assert_eq!(builtin_advance('i', FontFace::Mono), 600);
    }

    #[test]
    fn test_non_ascii_fallback() {
        assert_eq!(builtin_advance('é', FontFace::Regular), REGULAR_FALLBACK);
        assert_eq!(builtin_advance('\u{7f}', FontFace::Bold), BOLD_FALLBACK);
        assert_eq!(builtin_advance('\t', FontFace::Regular), REGULAR_FALLBACK);
    }

    #[test]
    fn test_width_scales_with_size() {
        let metrics = FontMetrics::builtin();
        // 72 pt = 25.4 mm; "0" is 556/1000 em.
        assert!(approx(
            metrics.text_width("0", Font::regular(72.0)),
            0.556 * 25.4
        ));
        // Courier is monospaced.
        assert!(approx(
            metrics.text_width("ABCDEFGH", Font::mono(10.0)),
            8.0 * 0.6 * 10.0 * PT_TO_MM
        ));
        assert_eq!(metrics.text_width("", Font::bold(12.0)), 0.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let metrics = FontMetrics::builtin();
        let text = "Consulting services";
        assert!(metrics.text_width(text, Font::bold(10.0)) > metrics.text_width(text, Font::regular(10.0)));
    }

    #[test]
    fn test_invalid_ttf_is_rejected() {
        assert!(matches!(
            FontMetrics::from_ttf(b"definitely not a font".to_vec()),
            Err(RenderError::Font { .. })
        ));
        assert!(FontMetrics::load_ttf(Path::new("/nonexistent/font.ttf")).is_err());

        let err = FontMetrics::builtin()
            .load_bold_ttf(Path::new("/nonexistent/bold.ttf"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Font { ref path, .. } if path == Path::new("/nonexistent/bold.ttf")));
    }

    #[test]
    fn test_bold_synthesis() {
        assert!(!FontMetrics::builtin().bold_is_synthetic());

        // Byte contents are irrelevant to the decision.
        let regular_only = FontMetrics {
            external: Some(Arc::from(vec![0u8; 4])),
            external_bold: None,
        };
        assert!(regular_only.bold_is_synthetic());

        let both = FontMetrics {
            external_bold: Some(Arc::from(vec![0u8; 4])),
            ..regular_only.clone()
        };
        assert!(!both.bold_is_synthetic());

        let bold_only = FontMetrics {
            external: None,
            ..both
        };
        assert!(!bold_only.bold_is_synthetic());
    }
}
