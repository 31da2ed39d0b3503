//! Inbound adapters driving the session client.
//!
//! - **console**: line-oriented command reader standing in for a UI.

pub mod console;
