//! State module for tracking ingestion progress
//!
//! The source ingester walks a small state machine from `Uninitialized`
//! through paging to one of two terminal states.

mod ingestion_state;

// Re-export main types
pub use ingestion_state::IngestionState;
