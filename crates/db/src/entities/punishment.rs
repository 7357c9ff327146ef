//! Punishment entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The kind of restrictive action a punishment records.
///
/// Only account bans, address bans and mutes gate future admission;
/// kicks and warnings are history rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PunishmentKind {
    /// Ban keyed on an account identifier.
    #[sea_orm(string_value = "account_ban")]
    AccountBan,
    /// Ban keyed on a network address.
    #[sea_orm(string_value = "address_ban")]
    AddressBan,
    /// Chat restriction keyed on an account identifier.
    #[sea_orm(string_value = "mute")]
    Mute,
    /// Point-in-time disconnect; never carries an expiry.
    #[sea_orm(string_value = "kick")]
    Kick,
    /// Warning; counts toward escalation but never gates admission.
    #[sea_orm(string_value = "warn")]
    Warn,
}

impl PunishmentKind {
    /// Whether an active punishment of this kind blocks login or chat.
    #[must_use]
    pub const fn is_restricting(self) -> bool {
        matches!(self, Self::AccountBan | Self::AddressBan | Self::Mute)
    }
}

/// Punishment model - one row per ban, address ban, mute, kick or warning.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "punishment")]
pub struct Model {
    /// Store-assigned, monotonically increasing.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account identifier, when the subject resolved to an account.
    pub subject_account_id: Option<String>,
    /// Display name; `"IP <addr>"` or `"Unknown"` when nothing better exists.
    pub subject_display_name: String,
    /// Textual network address; required for address bans.
    pub subject_address: Option<String>,
    /// What kind of action this row records.
    pub kind: PunishmentKind,
    /// Free-text reason shown to the subject.
    pub reason: String,
    /// Staff actor who issued the action.
    pub issued_by: String,
    /// When the punishment was created. Never mutated.
    pub created_at: DateTimeWithTimeZone,
    /// When the punishment expires (None = permanent).
    pub expires_at: Option<DateTimeWithTimeZone>,
    /// Stored activity flag. A cache of the expiry predicate, corrected
    /// lazily at read time; never trusted without checking `expires_at`.
    pub active: bool,
}

impl Model {
    /// Whether this row is currently in force at `now`.
    ///
    /// The stored `active` flag alone is not authoritative; a row whose
    /// expiry has passed is expired even while the flag still reads true.
    #[must_use]
    pub fn is_in_force_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.active && self.expires_at.is_none_or(|expires| expires > now)
    }

    /// Whether the row has an expiry that already passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
