//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the remote API and exercise the
//! HTTP client and full batch runs end to end.

mod client_tests;
mod harvest_tests;
