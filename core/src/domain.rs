//! Domain derivation from URLs.

use url::Url;

/// Returns the host component of `raw` (with `:port` when non-default).
///
/// Strings that do not parse as absolute URLs are returned trimmed, so bare
/// hosts such as `example.com` map to themselves.
///
/// # Examples
///
/// ```
/// use competitor_report_core::domain_of;
///
/// assert_eq!(domain_of("https://www.example.org/pricing?x=1"), "www.example.org");
/// assert_eq!(domain_of("http://localhost:8080/"), "localhost:8080");
/// assert_eq!(domain_of("example.com"), "example.com");
/// ```
pub fn domain_of(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    let Some(host) = url.host_str() else {
        return trimmed.to_string();
    };
    let host = host.trim_end_matches('.');
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Maps each URL to its domain, dropping repeats and keeping first-seen order.
pub fn unique_domains<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for url in urls {
        let domain = domain_of(url.as_ref());
        if !domain.is_empty() && !out.contains(&domain) {
            out.push(domain);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_of_strips_path_and_query() {
        assert_eq!(domain_of("https://a.example/x/y?z=1#frag"), "a.example");
    }

    #[test]
    fn test_domain_of_lowercases_host() {
        assert_eq!(domain_of("HTTPS://Shop.Example.COM/"), "shop.example.com");
    }

    #[test]
    fn test_domain_of_drops_default_port_and_trailing_dot() {
        assert_eq!(domain_of("https://a.example:443/"), "a.example");
        assert_eq!(domain_of("https://a.example./"), "a.example");
    }

    #[test]
    fn test_unique_domains_collapses_shared_hosts() {
        let urls = [
            "https://a.example/one",
            "https://b.example/",
            "https://a.example/two",
        ];
        assert_eq!(unique_domains(&urls), vec!["a.example", "b.example"]);
    }
}
