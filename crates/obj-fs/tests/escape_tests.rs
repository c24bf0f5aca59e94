//! Escaping and hash truncation behaviour relied on for cross-node file names

use obj_fs::{HOSTILE_CHARS, escape_name, truncate_using_hash, unescape_name};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("host1", "host1")]
#[case("host1!ping", "host1!ping")]
#[case("a/b", "a%2fb")]
#[case("a\\b", "a%5cb")]
#[case("x:y", "x%3ay")]
#[case("what?", "what%3f")]
#[case("glob*", "glob%2a")]
#[case("pipe|line", "pipe%7cline")]
#[case("<tag>", "%3ctag%3e")]
#[case("say \"hi\"", "say %22hi%22")]
#[case("50%", "50%25")]
fn test_escape_cases(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(escape_name(input), expected);
}

#[test]
fn test_escaped_names_contain_no_hostile_characters() {
    let all = format!("start{HOSTILE_CHARS}end");
    let escaped = escape_name(&all);
    assert!(!escaped.contains(|c| HOSTILE_CHARS.contains(c)));
}

proptest! {
    #[test]
    fn test_unescape_reverses_escape(s in "\\PC*") {
        let escaped = escape_name(&s);
        prop_assert_eq!(unescape_name(&escaped).unwrap(), s);
    }

    #[test]
    fn test_escape_output_is_filesystem_safe(s in "\\PC*") {
        let escaped = escape_name(&s);
        prop_assert!(!escaped.contains(|c| HOSTILE_CHARS.contains(c)));
    }

    #[test]
    fn test_escape_is_stable_for_safe_names(s in "[A-Za-z0-9!._-]*") {
        // Names without hostile characters or '%' map to themselves.
        prop_assert_eq!(escape_name(&s), s);
    }

    #[test]
    fn test_truncation_is_bounded_and_deterministic(s in "\\PC{0,300}") {
        let a = truncate_using_hash(&s, 123);
        let b = truncate_using_hash(&s, 123);
        prop_assert!(a.len() <= 123);
        prop_assert_eq!(a, b);
    }
}
