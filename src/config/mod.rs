//! Configuration module for Site-Sift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_sift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-sift.toml")).unwrap();
//! println!("Crawl scope: {}", config.crawler.scope);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, IndexConfig, OutputConfig, TargetConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
