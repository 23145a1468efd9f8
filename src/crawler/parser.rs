//! HTML link extraction
//!
//! Links to follow come from `<a href>` tags, resolved against the page URL
//! and filtered to the crawl scope.

use crate::url::LinkFilter;
use scraper::{Html, Selector};
use url::Url;

/// Extracts the followable links of a page
///
/// Links keep the document order of their `<a>` tags and are not
/// deduplicated; the frontier takes care of that.
///
/// # Example
///
/// ```
/// use site_sift::crawler::extract_links;
/// use site_sift::url::LinkFilter;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/dept/a.html">A</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/dept/").unwrap();
/// let filter = LinkFilter::new("https://example.com/dept/", &[".html".to_string()]);
/// let links = extract_links(html, &base_url, &filter);
/// assert_eq!(links, vec!["https://example.com/dept/a.html"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url, filter: &LinkFilter) -> Vec<String> {
    let document = Html::parse_document(html);
    collect_links(&document, base_url, filter)
}

fn collect_links(document: &Html, base_url: &Url, filter: &LinkFilter) -> Vec<String> {
    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| filter.accept(href, base_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: &str = "https://www.cpp.edu/engineering/";

    fn filter() -> LinkFilter {
        LinkFilter::new(
            SCOPE,
            &[".html".to_string(), ".shtml".to_string(), ".htm".to_string()],
        )
    }

    fn base_url() -> Url {
        Url::parse("https://www.cpp.edu/engineering/ce/index.shtml").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        extract_links(html, &base_url(), &filter())
    }

    #[test]
    fn test_extract_relative_link() {
        let found = links(r#"<a href="faculty.shtml">Faculty</a>"#);
        assert_eq!(found, vec!["https://www.cpp.edu/engineering/ce/faculty.shtml"]);
    }

    #[test]
    fn test_parent_relative_link_resolved_before_filtering() {
        let found = links(r#"<a href="../x.html">X</a>"#);
        assert_eq!(found, vec!["https://www.cpp.edu/engineering/x.html"]);
    }

    #[test]
    fn test_links_keep_document_order_and_duplicates() {
        let html = r#"
            <a href="/engineering/b.html">B</a>
            <a href="/engineering/a.html">A</a>
            <a href="/engineering/b.html">B again</a>
        "#;
        assert_eq!(
            links(html),
            vec![
                "https://www.cpp.edu/engineering/b.html",
                "https://www.cpp.edu/engineering/a.html",
                "https://www.cpp.edu/engineering/b.html",
            ]
        );
    }

    #[test]
    fn test_discards_out_of_scope_and_non_http() {
        let html = r#"
            <a href="https://www.cpp.edu/admissions/index.html">Elsewhere</a>
            <a href="ftp://www.cpp.edu/engineering/file.html">FTP</a>
            <a href="mailto:dean@cpp.edu">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="/engineering/report.pdf">PDF</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_fragment_dropped() {
        let found = links(r#"<a href="/engineering/ce/index.shtml#news">News</a>"#);
        assert_eq!(found, vec!["https://www.cpp.edu/engineering/ce/index.shtml"]);
    }

    #[test]
    fn test_directory_link_accepted() {
        let found = links(r#"<a href="/engineering/me/">ME</a>"#);
        assert_eq!(found, vec!["https://www.cpp.edu/engineering/me/"]);
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        assert!(links(r#"<a name="top">Top</a>"#).is_empty());
    }
}
