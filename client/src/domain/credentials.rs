//! Credential input supplied by a front end.
//!
//! The identity provider is authoritative for credential rules, so these
//! constructors only shape the input; blank values are forwarded and the
//! provider's rejection message is surfaced instead.

use std::fmt;

use zeroize::Zeroizing;

/// Name, email and password entered by the user.
///
/// ## Invariants
/// - `name` is present for registration and absent for login.
/// - `password` is wiped from memory when the value is dropped and never
///   appears in `Debug` output.
///
/// # Examples
/// ```
/// use session_client::domain::Credentials;
///
/// let creds = Credentials::registration("Ali", "ali1@email.com", "12345");
/// assert_eq!(creds.name(), Some("Ali"));
/// assert_eq!(creds.email(), "ali1@email.com");
///
/// let creds = Credentials::login("ali1@email.com", "12345");
/// assert!(creds.name().is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    name: Option<String>,
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Credentials for creating a new account.
    pub fn registration(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Credentials for signing in to an existing account.
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Display name, present only for registration.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Email address identifying the account.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password exactly as entered.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}
