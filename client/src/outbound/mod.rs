//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **identity**: `reqwest`-backed identity provider speaking the JSON
//!   register/login/logout contract.
//!
//! Adapters are thin translators that convert between domain types and wire
//! representations. They contain no session logic.

pub mod identity;
