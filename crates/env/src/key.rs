//! Property key normalization
//!
//! Configuration files spell keys as `server.max-connections`, the process
//! environment as `SERVER_MAX_CONNECTIONS`. Both reduce to the same
//! normalized form: lowercase segments joined by `.`.

/// Separators treated as segment boundaries
const SEPARATORS: [char; 3] = ['.', '-', '_'];

/// Normalize a property key.
///
/// Lowercases the key, treats `.`, `-` and `_` as equivalent separators and
/// drops empty segments, so `foo.bar-baz`, `FOO_BAR_BAZ` and `foo..bar_baz`
/// all normalize to `foo.bar.baz`.
pub fn normalize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for segment in key.split(SEPARATORS).filter(|s| !s.is_empty()) {
        if !out.is_empty() {
            out.push('.');
        }
        out.extend(segment.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Check whether `key` (already normalized) lies under `prefix` (already
/// normalized). An empty prefix matches every key.
pub fn is_under(key: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Check whether a key looks like it holds a secret
pub(crate) fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    ["password", "secret", "token", "api_key", "apikey", "private", "credential"]
        .iter()
        .any(|marker| key.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_equivalent_spellings() {
        assert_eq!(normalize("foo.bar-baz"), "foo.bar.baz");
        assert_eq!(normalize("FOO_BAR_BAZ"), "foo.bar.baz");
        assert_eq!(normalize("Foo.Bar_baz"), "foo.bar.baz");
        assert_eq!(normalize("foo..bar__baz-"), "foo.bar.baz");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("port"), "port");
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("datasources.default.url", "datasources"));
        assert!(is_under("datasources.default.url", "datasources.default"));
        assert!(!is_under("datasourcesx.url", "datasources"));
        assert!(!is_under("datasources", "datasources"));
        assert!(is_under("anything", ""));
    }

    #[test]
    fn test_is_sensitive() {
        assert!(is_sensitive("db.password"));
        assert!(is_sensitive("API_KEY"));
        assert!(is_sensitive("oauth.client-secret"));
        assert!(!is_sensitive("db.port"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(key in "[a-zA-Z0-9._-]{0,24}") {
            let once = normalize(&key);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn dotted_and_env_spellings_agree(segments in proptest::collection::vec("[a-z][a-z0-9]{0,6}", 1..5)) {
            let dotted = segments.join(".");
            let env = segments.join("_").to_uppercase();
            prop_assert_eq!(normalize(&dotted), normalize(&env));
        }
    }
}
