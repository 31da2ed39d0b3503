//! Driven port for the remote identity provider.
//!
//! The provider owns credential validation, account creation and token
//! issuance/revocation. The domain only relies on the outcome of each call:
//! an issued session, an echoed account, or a typed failure.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Account, BearerToken, Credentials, Session};

define_port_error! {
    /// Errors surfaced while calling the identity provider.
    pub enum IdentityProviderError {
        /// The provider answered with a non-success status and a message.
        Rejected { status: u16, message: String } =>
            "{message}",
        /// The response body did not match the expected shape for its status.
        Decode { message: String } =>
            "identity provider response decode failed: {message}",
        /// Network transport failed before a complete response arrived.
        Transport { message: String } =>
            "identity provider transport failed: {message}",
        /// The call exceeded the configured request timeout.
        Timeout { message: String } =>
            "identity provider timeout: {message}",
        /// The adapter could not build the request.
        InvalidRequest { message: String } =>
            "identity provider request invalid: {message}",
    }
}

impl IdentityProviderError {
    /// Return whether this is a domain rejection rather than a
    /// protocol or transport failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Return whether the provider reported the presented token as no longer
    /// valid.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}

/// Port for the identity provider's register, login, logout and account
/// echo endpoints.
///
/// Each method performs exactly one round trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and issue a token for it.
    ///
    /// `credentials` must carry a name; adapters reject nameless
    /// credentials with [`IdentityProviderError::InvalidRequest`].
    async fn register(&self, credentials: &Credentials) -> Result<Session, IdentityProviderError>;

    /// Validate credentials and issue a token.
    async fn login(&self, credentials: &Credentials) -> Result<Session, IdentityProviderError>;

    /// Revoke `token`.
    async fn logout(&self, token: &BearerToken) -> Result<(), IdentityProviderError>;

    /// Return the account `token` was issued for.
    async fn current_account(&self, token: &BearerToken)
    -> Result<Account, IdentityProviderError>;
}
