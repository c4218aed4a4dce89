//! # Print-Only Protection
//!
//! Exported documents open without a password and may be printed; every
//! other permission is withheld through the standard security handler
//! (RC4, 128-bit key). The owner password is random and never stored.

use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::debug;

use crate::error::{ExportError, ExportResult};

const OWNER_PASSWORD_LEN: usize = 32;

/// Re-encodes the PDF in `bytes` so that it can only be read and printed.
pub fn print_only(bytes: &[u8]) -> ExportResult<Vec<u8>> {
    let mut document = Document::load_mem(bytes).map_err(protect_error)?;
    ensure_file_id(&mut document);

    let owner_password: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(OWNER_PASSWORD_LEN)
        .map(char::from)
        .collect();

    let version = EncryptionVersion::V2 {
        document: &document,
        owner_password: &owner_password,
        user_password: "",
        key_length: 128,
        permissions: Permissions::PRINTABLE,
    };
    let state = EncryptionState::try_from(version).map_err(protect_error)?;
    document.encrypt(&state).map_err(protect_error)?;

    let mut output = Vec::with_capacity(bytes.len());
    document.save_to(&mut output).map_err(protect_error)?;

    debug!(bytes = output.len(), "Print-only protection applied");
    Ok(output)
}

/// The key derivation reads the first `/ID` string, which printpdf does not
/// always write.
fn ensure_file_id(document: &mut Document) {
    let has_id = document
        .trailer
        .get(b"ID")
        .and_then(Object::as_array)
        .is_ok_and(|id| !id.is_empty());
    if has_id {
        return;
    }

    let id: [u8; 16] = OsRng.gen();
    let part = Object::String(id.to_vec(), StringFormat::Hexadecimal);
    document.trailer.set("ID", vec![part.clone(), part]);
}

fn protect_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Protect(err.to_string())
}
