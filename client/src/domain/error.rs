//! Session client error types.
//!
//! [`SessionError`] is the typed failure every operation returns. Front ends
//! render it through [`ErrorInfo`], which carries display text only.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ports::IdentityProviderError;

/// Display payload for a failed operation.
///
/// # Examples
/// ```
/// use session_client::domain::ErrorInfo;
///
/// let info = ErrorInfo::new("Invalid credentials");
/// assert_eq!(info.message(), "Invalid credentials");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    message: String,
}

impl ErrorInfo {
    /// Wrap display text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Text to show the user.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failures returned by [`super::SessionClient`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The identity provider call failed or was rejected.
    #[error(transparent)]
    Provider(#[from] IdentityProviderError),
    /// `register` or `login` was invoked while a session is held.
    #[error("already signed in; log out first")]
    AlreadyAuthenticated,
    /// An operation needing a token was invoked without a session.
    #[error("not signed in")]
    NotAuthenticated,
}

impl SessionError {
    /// Return whether the failure is something other than a provider
    /// rejection or a local state guard.
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Provider(error) => !error.is_rejection(),
            Self::AlreadyAuthenticated | Self::NotAuthenticated => false,
        }
    }

    /// HTTP status of a provider rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider(IdentityProviderError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// User-facing text for this failure.
    ///
    /// Rejections carry the provider's message verbatim. Protocol and
    /// transport failures become an "unexpected error" with the detail
    /// appended.
    ///
    /// # Examples
    /// ```
    /// use session_client::domain::SessionError;
    /// use session_client::domain::ports::IdentityProviderError;
    ///
    /// let rejected = SessionError::from(IdentityProviderError::rejected(422_u16, "Invalid credentials"));
    /// assert_eq!(rejected.info().message(), "Invalid credentials");
    ///
    /// let broken = SessionError::from(IdentityProviderError::transport("connection refused"));
    /// assert!(broken.info().message().starts_with("unexpected error:"));
    /// ```
    pub fn info(&self) -> ErrorInfo {
        match self {
            Self::Provider(IdentityProviderError::Rejected { message, .. }) => {
                ErrorInfo::new(message.as_str())
            }
            Self::Provider(error) => ErrorInfo::new(format!("unexpected error: {error}")),
            Self::AlreadyAuthenticated | Self::NotAuthenticated => ErrorInfo::new(self.to_string()),
        }
    }
}
