//! URL handling module for Seekr
//!
//! This module decides which links are worth following and whether their
//! hosts fall inside the configured interesting domains.

mod domain;
mod link;
mod matcher;

// Re-export main functions
pub use domain::{decompose, extract_domain};
pub use link::{classify_link, crawlable_links, ClassifiedLink};
pub use matcher::{InterestingDomains, LinkPolicy};
