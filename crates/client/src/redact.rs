//! Token redaction for log output.

/// Marker substituted for the hidden part of a secret.
pub const REDACTION_MARKER: &str = "[*]";

const VISIBLE_CHARS: usize = 4;

/// Render `token` as its first 4 and last 4 characters around `[*]`.
///
/// Tokens of 8 characters or fewer render as `[*]` alone.
pub fn redact_token(token: &str) -> String {
    let len = token.chars().count();
    if len <= VISIBLE_CHARS * 2 {
        return REDACTION_MARKER.to_string();
    }
    let head: String = token.chars().take(VISIBLE_CHARS).collect();
    let tail: String = token.chars().skip(len - VISIBLE_CHARS).collect();
    format!("{head}{REDACTION_MARKER}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_redact_long_token() {
        assert_eq!(redact_token("abcd1234wxyz"), "abcd[*]wxyz");
    }

    #[test]
    fn test_redact_short_tokens() {
        assert_eq!(redact_token(""), "[*]");
        assert_eq!(redact_token("abc"), "[*]");
        assert_eq!(redact_token("abcd1234"), "[*]");
        assert_eq!(redact_token("abcd12345"), "abcd[*]2345");
    }

    #[test]
    fn test_redact_multibyte() {
        assert_eq!(redact_token("ääääXXXXöööö"), "ääää[*]öööö");
    }

    proptest! {
        #[test]
        fn prop_redacted_never_contains_middle(token in "[a-z0-9]{9,64}") {
            let redacted = redact_token(&token);
            prop_assert!(redacted.starts_with(&token[..4]));
            prop_assert!(redacted.ends_with(&token[token.len() - 4..]));
            prop_assert_eq!(redacted.len(), 4 + REDACTION_MARKER.len() + 4);
        }
    }
}
