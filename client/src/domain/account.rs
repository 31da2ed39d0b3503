//! Provider-issued account identity.

use serde::{Deserialize, Serialize};

/// Account returned by the identity provider.
///
/// Accounts are never constructed from user input; adapters build them from
/// decoded provider responses.
///
/// # Examples
/// ```
/// use session_client::domain::Account;
///
/// let account = Account::new(1, "Ali", "ali1@email.com");
/// assert_eq!(account.email(), "ali1@email.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: i64,
    name: String,
    email: String,
}

impl Account {
    /// Build an account from provider-supplied fields.
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Provider-assigned numeric identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Display name recorded at registration.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address the account authenticates with.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
