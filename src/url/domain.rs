use url::Url;

/// Extracts the lowercase host (with a non-default port) from a URL string
///
/// Politeness delays are tracked per host, so `127.0.0.1:8080` and
/// `127.0.0.1:9090` count as different hosts.
///
/// # Examples
///
/// ```
/// use site_sift::url::extract_host;
///
/// assert_eq!(extract_host("https://WWW.CPP.EDU/a.html"), Some("www.cpp.edu".to_string()));
/// assert_eq!(extract_host("http://127.0.0.1:8080/"), Some("127.0.0.1:8080".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        assert_eq!(
            extract_host("https://example.com/path"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_default_port_omitted() {
        assert_eq!(
            extract_host("https://example.com:443/path"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_explicit_port_kept() {
        assert_eq!(
            extract_host("http://localhost:3000/"),
            Some("localhost:3000".to_string())
        );
    }

    #[test]
    fn test_no_host() {
        assert_eq!(extract_host("mailto:a@example.com"), None);
    }
}
