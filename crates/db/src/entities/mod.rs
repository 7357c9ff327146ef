//! Database entities.

pub mod punishment;

pub use punishment::Entity as Punishment;
pub use punishment::PunishmentKind;
