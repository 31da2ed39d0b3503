//! Test utilities shared by integration and behaviour tests.
//!
//! Enabled by the `test-support` feature. Nothing here is used by the
//! library itself.

pub mod identity_provider;

pub use identity_provider::{CannedResponse, FakeIdentityProvider, RecordedRequest};
