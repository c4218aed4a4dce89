//! # Quote Number Generation
//!
//! Draws 8-letter codes from `A..=Z` and retries against a uniqueness
//! oracle.
//!
//! ## Generation Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt 1..=100                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  draw 8 letters (fresh randomness, uniform over 26)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  oracle("QWERTYUI") ── taken ──► next attempt                          │
//! │       │                                                                 │
//! │     free                                                                │
//! │       ▼                                                                 │
//! │  return code                                                           │
//! │                                                                         │
//! │  after attempt 100 ──► CoreError::IdentifierExhausted                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The code carries no structure. The `YYYY-MM-` prefix shown on documents
//! is added by [`display_quote_number`] and is never stored.

use chrono::NaiveDate;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{CoreError, CoreResult};

/// Length of a stored quote number.
pub const QUOTE_NUMBER_LENGTH: usize = 8;

/// Letters a quote number is drawn from.
pub const QUOTE_NUMBER_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draws before giving up with [`CoreError::IdentifierExhausted`].
pub const MAX_QUOTE_NUMBER_ATTEMPTS: usize = 100;

/// Generates an unused quote number using the operating system RNG.
///
/// `is_taken` answers "does a persisted quote already use this code".
///
/// ## Example
/// ```rust
/// use quill_core::generate_quote_number;
///
/// let code = generate_quote_number(|_| false).unwrap();
/// assert_eq!(code.len(), 8);
/// assert!(code.bytes().all(|b| b.is_ascii_uppercase()));
/// ```
pub fn generate_quote_number<F>(mut is_taken: F) -> CoreResult<String>
where
    F: FnMut(&str) -> bool,
{
    try_generate_quote_number_with(&mut OsRng, |code| Ok::<_, CoreError>(is_taken(code)))
}

/// Generates an unused quote number with an explicit RNG and a fallible
/// oracle.
///
/// An oracle error stops the search and is returned unchanged.
pub fn try_generate_quote_number_with<R, F, E>(rng: &mut R, mut is_taken: F) -> Result<String, E>
where
    R: RngCore + CryptoRng,
    F: FnMut(&str) -> Result<bool, E>,
    E: From<CoreError>,
{
    let letters = Uniform::from(0..QUOTE_NUMBER_ALPHABET.len());

    for _ in 0..MAX_QUOTE_NUMBER_ATTEMPTS {
        let code: String = (0..QUOTE_NUMBER_LENGTH)
            .map(|_| QUOTE_NUMBER_ALPHABET[letters.sample(&mut *rng)] as char)
            .collect();

        if !is_taken(&code)? {
            return Ok(code);
        }
    }

    Err(CoreError::IdentifierExhausted {
        attempts: MAX_QUOTE_NUMBER_ATTEMPTS,
    }
    .into())
}

/// Formats the human-facing number `YYYY-MM-CODE`.
pub fn display_quote_number(issue_date: NaiveDate, code: &str) -> String {
    format!("{}-{}", issue_date.format("%Y-%m"), code)
}

/// Checks that `code` has the stored quote number shape.
pub fn is_valid_quote_number(code: &str) -> bool {
    code.len() == QUOTE_NUMBER_LENGTH && code.bytes().all(|b| QUOTE_NUMBER_ALPHABET.contains(&b))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_thousand_codes_have_the_right_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let code: String =
                try_generate_quote_number_with(&mut rng, |_| Ok::<_, CoreError>(false)).unwrap();
            assert!(is_valid_quote_number(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_os_rng_codes_have_the_right_shape() {
        for _ in 0..1000 {
            let code = generate_quote_number(|_| false).unwrap();
            assert!(is_valid_quote_number(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_succeeds_on_the_hundredth_attempt() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut calls = 0;
        let code = try_generate_quote_number_with(&mut rng, |_| {
            calls += 1;
            Ok::<_, CoreError>(calls < 100)
        })
        .unwrap();

        assert_eq!(calls, 100);
        assert!(is_valid_quote_number(&code));
    }

    #[test]
    fn test_exhausted_after_exactly_one_hundred_attempts() {
        let mut calls = 0;
        let result = generate_quote_number(|_| {
            calls += 1;
            true
        });

        assert_eq!(calls, MAX_QUOTE_NUMBER_ATTEMPTS);
        assert!(matches!(
            result,
            Err(CoreError::IdentifierExhausted { attempts: 100 })
        ));
    }

    #[test]
    fn test_every_attempt_draws_fresh_letters() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = Vec::new();
        let _ = try_generate_quote_number_with(&mut rng, |code| {
            seen.push(code.to_string());
            Ok::<_, CoreError>(true)
        });

        let distinct: HashSet<_> = seen.iter().collect();
        assert_eq!(seen.len(), 100);
        assert_eq!(distinct.len(), 100);
    }

    #[test]
    fn test_oracle_error_stops_the_search() {
        #[derive(Debug)]
        enum OracleError {
            Storage,
            Core,
        }
        impl From<CoreError> for OracleError {
            fn from(_: CoreError) -> Self {
                OracleError::Core
            }
        }

        let mut rng = StdRng::seed_from_u64(1);
        let mut calls = 0;
        let result: Result<String, OracleError> = try_generate_quote_number_with(&mut rng, |_| {
            calls += 1;
            Err(OracleError::Storage)
        });

        assert_eq!(calls, 1);
        assert!(matches!(result, Err(OracleError::Storage)));
    }

    #[test]
    fn test_display_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(display_quote_number(date, "ABCDEFGH"), "2026-03-ABCDEFGH");
    }

    #[test]
    fn test_shape_check() {
        assert!(is_valid_quote_number("ZZZZAAAA"));
        assert!(!is_valid_quote_number("ZZZZAAA"));
        assert!(!is_valid_quote_number("zzzzaaaa"));
        assert!(!is_valid_quote_number("ZZZZ1AAA"));
    }
}
