//! Text normalization and content fingerprints.
//!
//! Two quotes are the same quote iff their fingerprints match. Author,
//! source, tags, casing, and whitespace layout never distinguish quotes.

use sha2::{Digest, Sha256};

/// Prefix carried by the `hash` field of every stored record.
pub const HASH_PREFIX: &str = "sha256:";

/// Collapse whitespace runs to a single space, trim, and lowercase.
///
/// "Whitespace" is the ECMAScript `\s` class that existing collections were
/// hashed with. It differs from [`char::is_whitespace`]: U+FEFF counts,
/// U+0085 does not.
pub fn normalize(text: &str) -> String {
    text.split(is_collapsible_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_collapsible_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Lowercase hex SHA-256 of the normalized text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fingerprint of an optional body; absent text hashes like `""`.
pub fn fingerprint_opt(text: Option<&str>) -> String {
    fingerprint(text.unwrap_or_default())
}

/// Render a fingerprint as a stored `hash` value.
pub fn hash_field(fp: &str) -> String {
    format!("{}{}", HASH_PREFIX, fp)
}

/// Hex portion of a stored `hash` value. Values without the prefix are
/// returned as-is.
pub fn strip_hash_prefix(hash: &str) -> &str {
    hash.strip_prefix(HASH_PREFIX).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Hello \t\r\n  World\n"), "hello world");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn byte_order_mark_is_whitespace() {
        assert_eq!(normalize("\u{FEFF}Hello\u{FEFF}World"), "hello world");
        assert_eq!(normalize("a\u{3000}\u{00A0}b\u{2009}c"), "a b c");
        assert_eq!(fingerprint("\u{FEFF}Hello World"), fingerprint("hello world"));
    }

    #[test]
    fn next_line_is_not_whitespace() {
        assert_eq!(normalize("a\u{0085}b"), "a\u{0085}b");
        assert_ne!(fingerprint("a\u{0085}b"), fingerprint("a b"));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("The only way out is through.");
        let b = fingerprint("The only way out is through.");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn fingerprint_ignores_case_and_whitespace_runs() {
        assert_eq!(fingerprint("Hello   World\n"), fingerprint("hello world"));
    }

    #[test]
    fn fingerprint_matches_known_digest() {
        // sha256("hello world")
        assert_eq!(
            fingerprint("Hello World"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn absent_text_hashes_like_empty() {
        assert_eq!(fingerprint_opt(None), fingerprint(""));
    }

    #[test]
    fn hash_prefix_round_trip() {
        let fp = fingerprint("x");
        let stored = hash_field(&fp);
        assert!(stored.starts_with("sha256:"));
        assert_eq!(strip_hash_prefix(&stored), fp);
        assert_eq!(strip_hash_prefix("deadbeef"), "deadbeef");
    }
}
