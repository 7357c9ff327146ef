//! Database repositories.

pub mod punishment;

pub use punishment::PunishmentRepository;
