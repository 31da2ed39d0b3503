//! Identity provider outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `IdentityProvider` port.

mod dto;
mod http_provider;

pub use http_provider::{HttpIdentityProvider, IdentityEndpoints};
