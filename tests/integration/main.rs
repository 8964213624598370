//! Integration tests for Crawl-Compare
//!
//! Runner and comparator tests drive the engine through stub transports;
//! HTTP tests use wiremock to serve real pages.

mod comparator_tests;
mod runner_tests;
mod storage_tests;
mod support;
