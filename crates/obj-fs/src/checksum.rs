//! SHA-1 helpers for length-bounded file names
//!
//! SHA-1 is used for naming only, to match the file names older cluster
//! members compute. It is not used for integrity.

use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest.
pub const SHA1_HEX_LEN: usize = 40;

const TRAILER: &str = "...";

/// Compute the lowercase hex SHA-1 of string content.
pub fn sha1_hex(content: &str) -> String {
    format!("{:x}", Sha1::digest(content.as_bytes()))
}

/// Bound `input` to `max_len` bytes.
///
/// Inputs that already fit are returned unchanged. Longer inputs keep a
/// prefix of `max_len - 43` bytes, followed by `...` and the SHA-1 of the
/// complete input. The prefix is shortened to the nearest UTF-8 character
/// boundary, so the result may be a few bytes shorter than `max_len`.
pub fn truncate_using_hash(input: &str, max_len: usize) -> String {
    if input.len() <= max_len {
        return input.to_string();
    }

    let mut cut = max_len.saturating_sub(TRAILER.len() + SHA1_HEX_LEN);
    while !input.is_char_boundary(cut) {
        cut -= 1;
    }

    format!("{}{}{}", &input[..cut], TRAILER, sha1_hex(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_value() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            sha1_hex("hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn short_input_is_unchanged() {
        assert_eq!(truncate_using_hash("short", 123), "short");

        let exact = "x".repeat(123);
        assert_eq!(truncate_using_hash(&exact, 123), exact);
    }

    #[test]
    fn long_input_is_prefix_trailer_and_hash() {
        let input = "a".repeat(200);
        let out = truncate_using_hash(&input, 123);

        assert_eq!(out.len(), 123);
        assert!(out.starts_with(&"a".repeat(80)));
        assert_eq!(&out[80..83], "...");
        assert_eq!(&out[83..], sha1_hex(&input));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 79 ASCII bytes followed by a two-byte character straddling byte 80.
        let input = format!("{}é{}", "a".repeat(79), "b".repeat(100));
        let out = truncate_using_hash(&input, 123);

        assert!(out.len() <= 123);
        assert!(out.starts_with(&"a".repeat(79)));
        assert_eq!(&out[79..82], "...");
    }
}
