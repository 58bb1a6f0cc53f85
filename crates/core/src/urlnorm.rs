//! URL normalization for remote-match comparisons.
//!
//! Cache keys stay verbatim; only lookups against the remote service go
//! through the normalized form, so trivial URL variation (scheme, `www.`,
//! trailing slash, case) still finds the saved item.

/// Reduce a URL to its comparison key: strip the scheme, a leading `www.`
/// and any trailing slash, then lowercase.
pub fn comparison_key(url: &str) -> String {
    let mut s = url.trim();
    s = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s);
    s = s.strip_prefix("www.").unwrap_or(s);
    let s = s.strip_suffix('/').unwrap_or(s);
    s.to_lowercase()
}

/// The form the remote item search accepts: scheme stripped, case kept.
pub fn search_form(url: &str) -> String {
    let s = url.trim().trim_start_matches('@');
    s.strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_www_slash_and_case() {
        assert_eq!(comparison_key("http://Example.com/Path/"), "example.com/path");
        assert_eq!(comparison_key("https://www.example.com/Path"), "example.com/path");
        assert_eq!(comparison_key("example.com/Path"), "example.com/path");
    }

    #[test]
    fn equivalent_variants_share_a_key() {
        let variants = [
            "http://Example.com/Path/",
            "https://www.example.com/Path",
            "example.com/Path",
        ];
        let keys: Vec<_> = variants.iter().map(|u| comparison_key(u)).collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn bare_host() {
        assert_eq!(comparison_key("https://www.example.com/"), "example.com");
    }

    #[test]
    fn query_string_is_kept() {
        assert_eq!(
            comparison_key("https://example.com/a?b=C"),
            "example.com/a?b=c"
        );
    }

    #[test]
    fn search_form_keeps_case_and_path() {
        assert_eq!(search_form("https://Example.com/Path/"), "Example.com/Path/");
        assert_eq!(search_form("@https://example.com/x"), "example.com/x");
        assert_eq!(search_form("example.com"), "example.com");
    }
}
