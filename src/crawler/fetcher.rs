//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Redirect handling
//! - Content-Type validation

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum number of redirect hops followed for a single fetch
pub const MAX_REDIRECTS: usize = 10;

/// Content types accepted as markup documents
const MARKUP_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched a markup page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// The resource is not a markup document
    NotApplicable {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Transport error or non-success status
    Failed {
        /// Error description
        error: String,
    },
}

/// Formats the crawler's user agent string
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use site_sift::config::UserAgentConfig;
/// use site_sift::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "SiteSift".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true when a Content-Type header names a markup document
pub fn is_markup_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    MARKUP_CONTENT_TYPES.iter().any(|t| lowered.contains(t))
}

/// Fetches a URL with a single GET request
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with markup Content-Type | `Success` |
/// | 2xx with other Content-Type | `NotApplicable` |
/// | Non-2xx status | `Failed` |
/// | Timeout, connection or body error | `Failed` |
/// | Redirect chain > 10 | `Failed` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return FetchResult::Failed { error: describe_error(&e) },
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::Failed {
            error: format!("HTTP {}", status.as_u16()),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_markup_content_type(&content_type) {
        return FetchResult::NotApplicable { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::Failed {
            error: describe_error(&e),
        },
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        format!("Too many redirects (max {})", MAX_REDIRECTS)
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config, Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let config = create_test_config();
        assert_eq!(
            user_agent_string(&config),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[tokio::test]
    async fn test_fetch_success_reports_status_and_content_type() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page.html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&create_test_config(), Duration::from_secs(5)).unwrap();
        let url = format!("{}/page.html", server.uri());
        match fetch_url(&client, &url).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                assert_eq!(final_url, url);
                assert_eq!(status_code, 200);
                assert_eq!(content_type, "text/html; charset=utf-8");
                assert_eq!(body, "<html></html>");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_markup_not_applicable() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
            .mount(&server)
            .await;

        let client = build_http_client(&create_test_config(), Duration::from_secs(5)).unwrap();
        let result = fetch_url(&client, &format!("{}/report.pdf", server.uri())).await;
        assert!(matches!(
            result,
            FetchResult::NotApplicable { ref content_type } if content_type == "application/pdf"
        ));
    }

    #[test]
    fn test_markup_content_types() {
        assert!(is_markup_content_type("text/html"));
        assert!(is_markup_content_type("text/html; charset=utf-8"));
        assert!(is_markup_content_type("application/xhtml+xml"));
        assert!(is_markup_content_type("Text/HTML"));
        assert!(!is_markup_content_type("application/pdf"));
        assert!(!is_markup_content_type(""));
    }
}
