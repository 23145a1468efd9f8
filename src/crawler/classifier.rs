//! Target page recognition

use crate::config::TargetConfig;
use scraper::{Html, Selector};

/// Recognizes the page that ends the crawl
///
/// A page is the target when the first element matching the heading
/// selector has exactly the configured text (after trimming).
#[derive(Debug, Clone)]
pub struct TargetClassifier {
    heading_selector: String,
    heading_text: String,
}

impl TargetClassifier {
    pub fn new(heading_selector: impl Into<String>, heading_text: impl Into<String>) -> Self {
        Self {
            heading_selector: heading_selector.into(),
            heading_text: heading_text.into(),
        }
    }

    pub fn from_config(config: &TargetConfig) -> Self {
        Self::new(config.heading_selector.clone(), config.heading_text.clone())
    }

    /// Returns true when `html` is the target page
    ///
    /// An unparsable selector or a missing heading means "not the target".
    pub fn is_target(&self, html: &str) -> bool {
        let selector = match Selector::parse(&self.heading_selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!("Invalid heading selector {}: {:?}", self.heading_selector, e);
                return false;
            }
        };

        let document = Html::parse_document(html);
        document
            .select(&selector)
            .next()
            .map(|heading| heading.text().collect::<String>().trim() == self.heading_text)
            .unwrap_or(false)
    }
}
