//! Core punishment engine for warden.
//!
//! Composes the duration parser, punishment store and resolver into the
//! ledger facade consumed by the proxy's command and connection-event
//! collaborators.

pub mod services;

pub use services::*;
