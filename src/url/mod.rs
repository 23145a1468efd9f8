//! URL handling module for Site-Sift
//!
//! This module resolves discovered references against their page and decides
//! whether the resulting URL stays inside the crawl.

mod domain;
mod filter;
mod normalize;

pub use domain::extract_host;
pub use filter::LinkFilter;
pub use normalize::resolve_link;
