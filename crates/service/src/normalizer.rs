//! Canonical form of posted words.

use std::fmt;

use configs::WordPolicy;
use serde::Serialize;

use crate::errors::Rejection;

/// Minimum key length, in characters, under [`WordPolicy::Strict`].
pub const MIN_WORD_CHARS: usize = 2;

/// A trimmed, lower-cased, non-empty word. Only [`normalize`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TallyKey(String);

impl TallyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TallyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TallyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps raw input to its tally key.
///
/// Surrounding whitespace is dropped and the text is lower-cased with Unicode
/// default case mapping, so the result does not depend on the host locale.
/// `Strict` additionally refuses internal whitespace and keys shorter than
/// [`MIN_WORD_CHARS`].
pub fn normalize(raw: &str, policy: WordPolicy) -> Result<TallyKey, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::EmptyInput);
    }
    if policy == WordPolicy::Strict && trimmed.chars().any(char::is_whitespace) {
        return Err(Rejection::MultiWordInput);
    }

    let key = trimmed.to_lowercase();
    if policy == WordPolicy::Strict && key.chars().count() < MIN_WORD_CHARS {
        return Err(Rejection::TooShort);
    }
    Ok(TallyKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRICT: WordPolicy = WordPolicy::Strict;
    const LENIENT: WordPolicy = WordPolicy::Lenient;

    #[test]
    fn case_and_whitespace_insensitive() {
        let a = normalize("  Cat ", STRICT).unwrap();
        let b = normalize("cat", STRICT).unwrap();
        let c = normalize("CAT", STRICT).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "cat");
    }

    #[test]
    fn idempotent_for_accepted_inputs() {
        let inputs = ["Go", "  RUST\t", "Ünïcödé", "ΣΊΣΥΦΟΣ", "straße", "İstanbul", "hello world", "\u{a0}Tab\u{3000}"];
        for policy in [STRICT, LENIENT] {
            for raw in inputs {
                if let Ok(once) = normalize(raw, policy) {
                    let twice = normalize(once.as_str(), policy).unwrap();
                    assert_eq!(once, twice, "{raw:?} under {policy:?}");
                }
            }
        }
    }

    #[test]
    fn empty_and_blank_rejected_by_both_policies() {
        for policy in [STRICT, LENIENT] {
            assert_eq!(normalize("", policy), Err(Rejection::EmptyInput));
            assert_eq!(normalize("   ", policy), Err(Rejection::EmptyInput));
            assert_eq!(normalize("\n\t\u{3000}", policy), Err(Rejection::EmptyInput));
        }
    }

    #[test]
    fn strict_rejects_multiple_words() {
        assert_eq!(normalize("hello world", STRICT), Err(Rejection::MultiWordInput));
        assert_eq!(normalize(" hello\tworld ", STRICT), Err(Rejection::MultiWordInput));
    }

    #[test]
    fn strict_rejects_single_characters() {
        assert_eq!(normalize("a", STRICT), Err(Rejection::TooShort));
        assert_eq!(normalize("  É ", STRICT), Err(Rejection::TooShort));
        assert_eq!(normalize("ab", STRICT).unwrap().as_str(), "ab");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // two characters, four bytes
        assert_eq!(normalize("éé", STRICT).unwrap().as_str(), "éé");
    }

    #[test]
    fn lenient_accepts_phrases_and_single_letters() {
        assert_eq!(normalize("  Hello World ", LENIENT).unwrap().as_str(), "hello world");
        assert_eq!(normalize("A", LENIENT).unwrap().as_str(), "a");
    }
}
