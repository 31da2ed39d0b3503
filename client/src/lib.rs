//! Session client for a token-issuing identity provider.
//!
//! The crate is split hexagonally:
//! - [`domain`] owns credentials, accounts, sessions, errors and the
//!   [`domain::SessionClient`] state machine.
//! - [`domain::ports`] declares the driven [`domain::ports::IdentityProvider`]
//!   port the state machine calls.
//! - [`outbound`] implements that port over HTTP with `reqwest`.
//! - [`inbound`] drives the state machine from a line-oriented console.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod telemetry;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use domain::{SessionClient, SessionError, SessionState};
