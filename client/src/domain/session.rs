//! Authenticated session state.
//!
//! A [`Session`] pairs a bearer token with the account it was issued for.
//! Both halves are required to build one, so the anonymous/authenticated
//! split in [`SessionState`] can never hold a half-populated session.

use std::fmt;

use zeroize::Zeroizing;

use super::Account;

/// Opaque bearer credential issued by the identity provider.
///
/// The value is wiped on drop and never rendered by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a provider-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token value, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([redacted])")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Token plus the account it authenticates.
///
/// # Examples
/// ```
/// use session_client::domain::{Account, BearerToken, Session};
///
/// let session = Session::new(BearerToken::new("abc"), Account::new(1, "Ali", "ali1@email.com"));
/// assert_eq!(session.token().expose(), "abc");
/// assert_eq!(session.account().id(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: BearerToken,
    account: Account,
}

impl Session {
    /// Build a session from a freshly issued token and its account.
    pub fn new(token: BearerToken, account: Account) -> Self {
        Self { token, account }
    }

    /// Bearer token presented on authenticated calls.
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Account the token was issued for.
    pub fn account(&self) -> &Account {
        &self.account
    }
}

/// Whether a session client currently holds a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No token is held. Initial state.
    #[default]
    Anonymous,
    /// A token and its account are held.
    Authenticated(Session),
}

impl SessionState {
    /// Return the held session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(session) => Some(session),
        }
    }

    /// Return whether a session is held.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
