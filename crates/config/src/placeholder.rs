//! `${...}` placeholder substitution against a [`ConfigurationTree`].
//!
//! Supported forms:
//! - `${key}`: replaced by the value of `key`.
//! - `${key?default}`: `default` when `key` is absent.
//! - Nesting, e.g. `${cloud:config:${profile}}`; substituted values are
//!   themselves resolved.
//!
//! Unresolvable and circular placeholders are left verbatim. Resolution never fails.

use tracing::warn;

use crate::tree::ConfigurationTree;

const PREFIX: &str = "${";
const SUFFIX: &str = "}";
const DEFAULT_SEPARATOR: char = '?';

/// Substitute every placeholder in `value` using `tree`.
pub fn resolve_placeholders(value: &str, tree: &ConfigurationTree) -> String {
    let mut visiting = Vec::new();
    resolve(value, tree, &mut visiting)
}

fn resolve(value: &str, tree: &ConfigurationTree, visiting: &mut Vec<String>) -> String {
    let mut result = value.to_string();
    let mut search_from = 0;

    while let Some(offset) = result[search_from..].find(PREFIX) {
        let start = search_from + offset;
        let Some(end) = find_placeholder_end(&result, start + PREFIX.len()) else {
            break;
        };
        let placeholder = result[start + PREFIX.len()..end].to_string();

        if visiting
            .iter()
            .any(|v| v.eq_ignore_ascii_case(&placeholder))
        {
            warn!(placeholder = %placeholder, "Circular placeholder reference left unresolved");
            search_from = end + SUFFIX.len();
            continue;
        }

        visiting.push(placeholder.clone());
        let expression = resolve(&placeholder, tree, visiting);
        let replacement = lookup(&expression, tree).map(|found| resolve(&found, tree, visiting));
        visiting.pop();

        match replacement {
            Some(replacement) => {
                result.replace_range(start..end + SUFFIX.len(), &replacement);
                search_from = start + replacement.len();
            }
            None => search_from = end + SUFFIX.len(),
        }
    }

    result
}

fn lookup(expression: &str, tree: &ConfigurationTree) -> Option<String> {
    match expression.split_once(DEFAULT_SEPARATOR) {
        Some((key, default)) => Some(tree.get(key).unwrap_or(default).to_string()),
        None => tree.get(expression).map(str::to_string),
    }
}

/// Index of the `}` closing the placeholder whose body starts at `from`.
fn find_placeholder_end(value: &str, from: usize) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut depth = 0usize;
    let mut index = from;
    while index < bytes.len() {
        if bytes[index..].starts_with(PREFIX.as_bytes()) {
            depth += 1;
            index += PREFIX.len();
            continue;
        }
        if bytes[index] == b'}' {
            if depth == 0 {
                return Some(index);
            }
            depth -= 1;
        }
        index += 1;
    }
    None
}
