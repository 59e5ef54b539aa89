//! Config Server environment URI.

/// Replacement for `/` inside a label, as understood by the Config Server.
pub const LABEL_SLASH_ESCAPE: &str = "(_)";

/// `<base>/<name>/<environment>[/<label>]` with no double slash after `base`.
pub fn config_server_uri(
    base_uri: &str,
    name: &str,
    environment: &str,
    label: Option<&str>,
) -> String {
    let mut uri = format!("{}/{name}/{environment}", base_uri.trim_end_matches('/'));
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        uri.push('/');
        uri.push_str(&label.replace('/', LABEL_SLASH_ESCAPE));
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_without_label() {
        assert_eq!(
            config_server_uri("http://localhost:8888/", "orders", "Production", None),
            "http://localhost:8888/orders/Production"
        );
    }

    #[test]
    fn test_label_slashes_escaped() {
        assert_eq!(
            config_server_uri("http://localhost:8888", "orders", "dev", Some("feature/x")),
            "http://localhost:8888/orders/dev/feature(_)x"
        );
    }

    #[test]
    fn test_empty_label_ignored() {
        assert_eq!(
            config_server_uri("http://h", "a", "b", Some("")),
            "http://h/a/b"
        );
    }
}
