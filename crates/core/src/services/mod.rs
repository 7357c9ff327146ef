//! Punishment engine services.

#![allow(missing_docs)]

pub mod punishment;
pub mod resolver;

pub use punishment::{PunishmentInput, PunishmentService, CONSOLE_ISSUER, FALLBACK_REASON};
pub use resolver::PunishmentResolver;
