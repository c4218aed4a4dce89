//! # Render, Merge and Export Errors
//!
//! ```text
//! RenderError ─┐
//! MergeError  ─┼──► ExportError ──► AppError (CLI)
//! (protection) ┘
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while drawing the quote.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The PDF backend rejected an operation or failed to serialize.
    #[error("PDF backend error: {0}")]
    Backend(String),

    /// A configured TrueType font could not be read or parsed.
    ///
    /// ## When This Occurs
    /// - `render.font_path` points to a missing file
    /// - The file is not a TrueType/OpenType font
    #[error("Font error ({path}): {reason}")]
    Font { path: PathBuf, reason: String },

    /// Logo bytes are not a decodable image.
    #[error("Image decode failed: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures while appending the terms document.
#[derive(Debug, Error)]
pub enum MergeError {
    /// An input could not be read or copied into the scratch directory.
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input is not a parseable PDF.
    #[error("Malformed PDF {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// The combined objects have no catalog or page tree root.
    #[error("Merged document has no {0}")]
    MissingPageTree(&'static str),

    /// The scratch directory could not be created or removed.
    #[error("Scratch directory error: {0}")]
    Scratch(#[source] io::Error),

    /// The merged document could not be written.
    #[error("Cannot write merged document: {0}")]
    Write(#[source] io::Error),
}

/// Failures of the whole export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// Terms were present but could not be appended. No file was written
    /// to the target.
    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    /// The finished document could not be re-encoded as print-only.
    #[error("Cannot apply print-only protection: {0}")]
    Protect(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
pub type MergeResult<T> = Result<T, MergeError>;
pub type ExportResult<T> = Result<T, ExportError>;
