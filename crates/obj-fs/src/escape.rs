//! Filesystem-safe object name escaping
//!
//! Object names are operator supplied and may contain characters that are
//! illegal in file names on at least one supported platform. Each hostile
//! character, and the escape character `%` itself, is replaced by `%` plus
//! two lowercase hex digits. Escaping `%` keeps the mapping reversible, so
//! escaping is deliberately not idempotent: `escape_name("a/b")` is `a%2fb`
//! and escaping that again yields `a%252fb`.
//!
//! The byte output must stay identical across cluster members, as peers
//! derive the same config file name independently.

use std::fmt::Write;

use crate::{Error, Result};

/// Characters that are replaced in escaped names.
pub const HOSTILE_CHARS: &str = "<>:\"/\\|?*";

const ESCAPE_CHAR: char = '%';

fn needs_escape(c: char) -> bool {
    c == ESCAPE_CHAR || HOSTILE_CHARS.contains(c)
}

/// Escape an object name for use as a file name.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.chars() {
        if needs_escape(c) {
            // Every escaped character is ASCII, so it fits in two hex digits.
            let _ = write!(out, "{ESCAPE_CHAR}{:02x}", c as u32);
        } else {
            out.push(c);
        }
    }

    out
}

/// Reverse [`escape_name`].
///
/// # Errors
///
/// Returns `Error::InvalidEscape` when a `%` is not followed by two hex
/// digits.
pub fn unescape_name(escaped: &str) -> Result<String> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == ESCAPE_CHAR as u8 {
            let decoded = escaped
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| Error::InvalidEscape {
                    input: escaped.to_string(),
                    position: i,
                })?;
            out.push(decoded);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|e| Error::InvalidEscape {
        input: escaped.to_string(),
        position: e.utf8_error().valid_up_to(),
    })
}
