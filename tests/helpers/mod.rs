//! Shared test helpers for end-to-end tests.
//!
//! Lives in `helpers/mod.rs` so Cargo does not compile it as a standalone
//! integration test.

pub mod lsp_client;
pub mod test_fixtures;
