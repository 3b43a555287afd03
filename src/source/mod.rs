//! Upstream source of seed URLs
//!
//! This module handles:
//! - Talking to the paginated canister index (`IndexClient`)
//! - Turning index items into candidate URLs (`SourceIngester`)

mod index;
mod ingester;

pub use index::{
    IndexClient, IndexItem, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_REQUESTS_PER_SECOND,
};
pub use ingester::{
    IngestSummary, IngestionCursor, SourceIngester, DEFAULT_PROGRESS_EVERY, DEFAULT_URL_TEMPLATE,
};
