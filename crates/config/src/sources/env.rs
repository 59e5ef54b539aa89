//! Environment variable source.
//!
//! Responsibilities:
//! - Read process environment variables into a flat key map.
//! - Provide helper functions for reading env vars with empty/whitespace filtering.
//!
//! Invariants:
//! - `__` in a variable name maps to the `:` key delimiter.
//! - With a prefix filter, only matching variables are read and the prefix is stripped.
//! - Empty or whitespace-only values are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).

use std::collections::BTreeMap;

use crate::tree::KEY_DELIMITER;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Translate an environment variable name into a configuration key.
pub fn env_name_to_key(name: &str) -> String {
    name.replace("__", &KEY_DELIMITER.to_string())
}

/// Collect environment variables, optionally filtered by a case-insensitive prefix.
pub fn environment_entries(prefix: Option<&str>) -> BTreeMap<String, String> {
    collect_entries(std::env::vars(), prefix)
}

fn collect_entries<I>(vars: I, prefix: Option<&str>) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let prefix = prefix.unwrap_or_default();
    vars.into_iter()
        .filter_map(|(name, value)| {
            let stripped = strip_prefix_ignore_case(&name, prefix)?;
            let value = value.trim();
            if stripped.is_empty() || value.is_empty() {
                return None;
            }
            Some((env_name_to_key(stripped), value.to_string()))
        })
        .collect()
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if name.len() < prefix.len() || !name.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, tail) = name.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}
