//! DTOs for the identity provider's JSON bodies.
//!
//! Requests borrow from domain credentials; responses decode into transport
//! DTOs first, then map into domain sessions and accounts in one pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Account, BearerToken, Session};

#[derive(Serialize)]
pub(super) struct RegisterRequestDto<'a> {
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

/// Success body shared by register and login.
#[derive(Deserialize)]
pub(super) struct AuthResponseDto {
    pub(super) user: AccountDto,
    pub(super) token: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountDto {
    pub(super) id: i64,
    pub(super) name: String,
    pub(super) email: String,
}

/// Body of every non-success response.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponseDto {
    pub(super) message: String,
}

impl fmt::Debug for RegisterRequestDto<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequestDto")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl fmt::Debug for LoginRequestDto<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequestDto")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl fmt::Debug for AuthResponseDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponseDto")
            .field("user", &self.user)
            .field("token", &"[redacted]")
            .finish()
    }
}

impl AuthResponseDto {
    pub(super) fn into_session(self) -> Session {
        Session::new(BearerToken::new(self.token), self.user.into_account())
    }
}

impl AccountDto {
    pub(super) fn into_account(self) -> Account {
        Account::new(self.id, self.name, self.email)
    }
}
