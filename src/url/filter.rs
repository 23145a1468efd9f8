use crate::config::CrawlerConfig;
use crate::url::normalize::resolve_link;
use crate::{UrlError, UrlResult};
use url::Url;

/// Decides which discovered links stay inside the crawl
///
/// A link is kept when, after resolution against its page:
/// 1. its scheme is `http` or `https`
/// 2. its path is empty, ends with `/`, or ends with a configured extension
/// 3. its absolute form starts with the scope prefix
#[derive(Debug, Clone)]
pub struct LinkFilter {
    scope: String,
    extensions: Vec<String>,
}

impl LinkFilter {
    /// Creates a filter for the given scope prefix and document extensions
    ///
    /// Extensions are compared case-insensitively.
    pub fn new(scope: impl Into<String>, extensions: &[String]) -> Self {
        Self {
            scope: scope.into(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Creates a filter from the crawler section of the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.scope.clone(), &config.extensions)
    }

    /// Returns the scope prefix
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Resolves `href` against `base` and applies every rule in order
    ///
    /// The error names the first rule the link failed.
    pub fn check(&self, href: &str, base: &Url) -> UrlResult<Url> {
        let url = resolve_link(href, base)?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
        }

        if !self.has_document_path(url.path()) {
            return Err(UrlError::Extension(url.to_string()));
        }

        if !url.as_str().starts_with(&self.scope) {
            return Err(UrlError::OutOfScope(url.to_string()));
        }

        Ok(url)
    }

    /// Like [`LinkFilter::check`] but discards the rejection reason
    pub fn accept(&self, href: &str, base: &Url) -> Option<String> {
        match self.check(href, base) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::trace!("Discarding link {}: {}", href, e);
                None
            }
        }
    }

    fn has_document_path(&self, path: &str) -> bool {
        if path.is_empty() || path.ends_with('/') {
            return true;
        }

        let path = path.to_lowercase();
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}
