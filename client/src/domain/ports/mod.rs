//! Domain ports.
//!
//! Ports are the seams between the session state machine and infrastructure.
//! Adapters under `outbound` implement them; tests substitute doubles.

mod identity_provider;
mod macros;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
