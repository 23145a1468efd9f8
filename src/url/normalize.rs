use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a raw `href` against the page it was found on
///
/// # Resolution Steps
///
/// 1. Trim surrounding whitespace; reject empty references
/// 2. Join with the base URL (handles `../`, `./`, absolute paths and
///    scheme-relative references)
/// 3. Drop the fragment, since `page.html#bio` names the same resource
///
/// Scheme and scope are not checked here; see [`crate::url::LinkFilter`].
///
/// # Examples
///
/// ```
/// use site_sift::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/dept/faculty/index.html").unwrap();
/// let url = resolve_link("../x.html#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/dept/x.html");
/// ```
pub fn resolve_link(href: &str, base: &Url) -> UrlResult<Url> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Resolve {
            href: href.to_string(),
            message: "empty reference".to_string(),
        });
    }

    let mut url = base.join(href).map_err(|e| UrlError::Resolve {
        href: href.to_string(),
        message: e.to_string(),
    })?;
    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.cpp.edu/sci/computer-science/faculty/index.shtml").unwrap()
    }

    #[test]
    fn test_parent_relative_link() {
        let url = resolve_link("../x.html", &base()).unwrap();
        assert_eq!(url.as_str(), "https://www.cpp.edu/sci/computer-science/x.html");
    }

    #[test]
    fn test_sibling_relative_link() {
        let url = resolve_link("people.shtml", &base()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.cpp.edu/sci/computer-science/faculty/people.shtml"
        );
    }

    #[test]
    fn test_absolute_path_link() {
        let url = resolve_link("/sci/index.shtml", &base()).unwrap();
        assert_eq!(url.as_str(), "https://www.cpp.edu/sci/index.shtml");
    }

    #[test]
    fn test_scheme_relative_link() {
        let url = resolve_link("//other.edu/a.html", &base()).unwrap();
        assert_eq!(url.as_str(), "https://other.edu/a.html");
    }

    #[test]
    fn test_fragment_dropped() {
        let url = resolve_link("people.shtml#smith", &base()).unwrap();
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let url = resolve_link("  people.shtml \n", &base()).unwrap();
        assert!(url.as_str().ends_with("/faculty/people.shtml"));
    }

    #[test]
    fn test_empty_reference_rejected() {
        assert!(matches!(
            resolve_link("   ", &base()),
            Err(UrlError::Resolve { .. })
        ));
    }

    #[test]
    fn test_non_http_scheme_still_resolves() {
        let url = resolve_link("mailto:someone@cpp.edu", &base()).unwrap();
        assert_eq!(url.scheme(), "mailto");
    }
}
