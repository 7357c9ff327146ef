//! Active-restriction resolution with lazy expiry.
//!
//! No background sweeper exists: a punishment whose expiry has passed is
//! retired the first time a read observes it. The stored `active` flag is
//! a cache of the expiry predicate, never ground truth.

use chrono::Utc;
use tracing::{debug, warn};
use warden_common::AppResult;
use warden_db::{
    entities::punishment::{self, PunishmentKind},
    repositories::PunishmentRepository,
};

/// Resolves the single currently-active restriction for a subject.
#[derive(Clone)]
pub struct PunishmentResolver {
    repo: PunishmentRepository,
}

impl PunishmentResolver {
    /// Create a new resolver over the punishment store.
    #[must_use]
    pub const fn new(repo: PunishmentRepository) -> Self {
        Self { repo }
    }

    /// Resolve the currently-active restriction of `kind` for a subject.
    ///
    /// The store lookup tries the account id first and the address only
    /// when the account lookup misses. A row whose expiry has passed is
    /// retired (`active=false`) as a side effect of this read and reported
    /// as "no active restriction". A failed retirement is logged and
    /// swallowed; the row stays inconsistently active in storage until the
    /// next read corrects it.
    ///
    /// Kicks and warnings never gate admission, so resolving one of those
    /// kinds answers `None` without touching the store.
    pub async fn resolve(
        &self,
        kind: PunishmentKind,
        account_id: Option<&str>,
        address: Option<&str>,
    ) -> AppResult<Option<punishment::Model>> {
        if !kind.is_restricting() {
            return Ok(None);
        }

        let Some(found) = self
            .repo
            .find_latest_active(kind, account_id, address)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now().fixed_offset();
        if found.is_expired_at(now) {
            match self.repo.set_active(found.id, false).await {
                Ok(()) => debug!(
                    id = found.id,
                    kind = ?kind,
                    subject = %found.subject_display_name,
                    "Retired expired punishment"
                ),
                Err(e) => warn!(
                    id = found.id,
                    kind = ?kind,
                    subject = %found.subject_display_name,
                    error = %e,
                    "Failed to retire expired punishment"
                ),
            }
            return Ok(None);
        }

        Ok(Some(found))
    }

    /// Resolve the ban gating a connecting subject.
    ///
    /// An account-level ban always wins over an address-level one: "the
    /// person is banned" is stronger evidence than "this address is
    /// banned", and its reason is the more specific one to show. The
    /// address lookup only runs when the account lookup misses, keeping
    /// the login path at the minimum number of round trips.
    pub async fn resolve_account_ban(
        &self,
        account_id: Option<&str>,
        address: Option<&str>,
    ) -> AppResult<Option<punishment::Model>> {
        if let Some(account_id) = account_id {
            let ban = self
                .resolve(PunishmentKind::AccountBan, Some(account_id), None)
                .await?;
            if ban.is_some() {
                return Ok(ban);
            }
        }

        if let Some(address) = address {
            return self
                .resolve(PunishmentKind::AddressBan, None, Some(address))
                .await;
        }

        Ok(None)
    }

    /// Resolve the mute gating a chatting subject.
    ///
    /// Mutes are not address-scoped; this is a single account-id lookup.
    pub async fn resolve_mute(&self, account_id: &str) -> AppResult<Option<punishment::Model>> {
        self.resolve(PunishmentKind::Mute, Some(account_id), None)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn record(
        id: i64,
        kind: PunishmentKind,
        expires_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    ) -> punishment::Model {
        punishment::Model {
            id,
            subject_account_id: Some("acc1".to_string()),
            subject_display_name: "Steve".to_string(),
            subject_address: Some("1.2.3.4".to_string()),
            kind,
            reason: "griefing".to_string(),
            issued_by: "Alex".to_string(),
            created_at: Utc::now().fixed_offset(),
            expires_at,
            active: true,
        }
    }

    fn resolver_with(db: MockDatabase) -> PunishmentResolver {
        let repo = PunishmentRepository::new(Arc::new(db.into_connection()));
        PunishmentResolver::new(repo)
    }

    #[tokio::test]
    async fn test_resolve_returns_valid_record() {
        let ban = record(1, PunishmentKind::AccountBan, None);
        let resolver = resolver_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[ban.clone()]]),
        );

        let found = resolver
            .resolve(PunishmentKind::AccountBan, Some("acc1"), None)
            .await
            .unwrap();

        assert_eq!(found, Some(ban));
    }

    #[tokio::test]
    async fn test_resolve_retires_expired_record() {
        let expired = record(
            2,
            PunishmentKind::Mute,
            Some(Utc::now().fixed_offset() - Duration::seconds(1)),
        );
        let resolver = resolver_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[expired]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        let found = resolver
            .resolve(PunishmentKind::Mute, Some("acc1"), None)
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_resolve_survives_failed_retirement() {
        // The lazy-expiry write fails; the read still reports no active
        // restriction.
        let expired = record(
            3,
            PunishmentKind::Mute,
            Some(Utc::now().fixed_offset() - Duration::seconds(1)),
        );
        let resolver = resolver_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[expired]])
                .append_exec_errors([sea_orm::DbErr::Custom("connection lost".to_string())]),
        );

        let found = resolver
            .resolve(PunishmentKind::Mute, Some("acc1"), None)
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_account_ban_wins_over_address_ban() {
        let account_ban = record(4, PunishmentKind::AccountBan, None);
        let resolver = resolver_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account_ban.clone()]]),
        );

        let found = resolver
            .resolve_account_ban(Some("acc1"), Some("1.2.3.4"))
            .await
            .unwrap();

        // The address-ban query never runs; only one result was queued.
        assert_eq!(found, Some(account_ban));
    }

    #[tokio::test]
    async fn test_address_ban_found_when_account_ban_misses() {
        let address_ban = record(5, PunishmentKind::AddressBan, None);
        let resolver = resolver_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                // account-ban lookup misses, address-ban lookup hits
                .append_query_results([vec![], vec![address_ban.clone()]]),
        );

        let found = resolver
            .resolve_account_ban(Some("acc1"), Some("1.2.3.4"))
            .await
            .unwrap();

        assert_eq!(found, Some(address_ban));
    }

    #[tokio::test]
    async fn test_non_restricting_kinds_skip_the_store() {
        // No query results queued: a store lookup would error.
        let resolver = resolver_with(MockDatabase::new(DatabaseBackend::Postgres));

        for kind in [PunishmentKind::Kick, PunishmentKind::Warn] {
            let found = resolver.resolve(kind, Some("acc1"), None).await.unwrap();
            assert!(found.is_none());
        }
    }

    #[tokio::test]
    async fn test_no_keys_resolves_to_none() {
        let resolver = resolver_with(MockDatabase::new(DatabaseBackend::Postgres));

        let found = resolver.resolve_account_ban(None, None).await.unwrap();
        assert!(found.is_none());
    }
}
