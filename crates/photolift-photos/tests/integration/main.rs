//! Integration tests for photolift-photos
//!
//! Uses wiremock to simulate the upload endpoint, `mediaItems:batchCreate`
//! and the OAuth token endpoint, and verifies end-to-end behavior of the
//! provider, the credential cache and the full migration pipeline.

mod common;

mod test_pipeline;
mod test_upload;
