//! Domain primitives and the session state machine.
//!
//! Purpose: Define the transport-agnostic types exchanged with an identity
//! provider and the rules for moving between anonymous and authenticated
//! states. Adapters translate wire payloads into these types; nothing here
//! knows about HTTP.
//!
//! Public surface:
//! - Credentials: name/email/password input supplied by a front end.
//! - Account: provider-issued account identity.
//! - BearerToken, Session, SessionState: authenticated state.
//! - ErrorInfo, SessionError: user-facing and typed failures.
//! - SessionClient: the state machine driving the three operations.

pub mod account;
pub mod credentials;
pub mod error;
pub mod ports;
pub mod session;
pub mod session_client;

pub use self::account::Account;
pub use self::credentials::Credentials;
pub use self::error::{ErrorInfo, SessionError};
pub use self::session::{BearerToken, Session, SessionState};
pub use self::session_client::SessionClient;
