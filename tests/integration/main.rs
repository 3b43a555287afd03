//! Integration tests for seekr
//!
//! These tests use wiremock to stand in for the canister index and for
//! canister front-ends.

mod crawl_tests;
mod source_tests;
