//! Shared helpers for tests that talk to the fake identity provider.

use std::time::Duration;

use session_client::outbound::identity::{HttpIdentityProvider, IdentityEndpoints};
use session_client::test_support::FakeIdentityProvider;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the reqwest adapter pointed at `fake`.
pub fn adapter_for(fake: &FakeIdentityProvider, timeout: Duration) -> HttpIdentityProvider {
    let endpoints = IdentityEndpoints::from_base(fake.base_url()).expect("fake base url");
    HttpIdentityProvider::new(endpoints, timeout).expect("reqwest client")
}
