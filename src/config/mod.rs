//! Configuration module for Seekr
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and reading the plain-text word and domain lists.
//!
//! # Example
//!
//! ```no_run
//! use seekr::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("seekr.toml")).unwrap();
//! println!("Reading words from {}", config.dictionary.word_file.display());
//! ```

mod lists;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DictionaryConfig, OutputConfig, SourceConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use lists::{read_list, read_optional_list};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_domains};
