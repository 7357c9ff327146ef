//! Punishment ledger - the public contract of the punishment engine.
//!
//! Creates punishment records, answers "is this subject currently
//! banned/muted", reverses restrictions, counts and clears warnings and
//! serves history. Composes the duration parser, the punishment store and
//! the resolver.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::Set;
use tracing::{error, info};
use warden_common::{format_remaining_at, AppError, AppResult, ModerationConfig, SubjectKey};
use warden_db::{
    entities::punishment::{self, PunishmentKind},
    repositories::PunishmentRepository,
};

use super::resolver::PunishmentResolver;

/// Reason recorded when staff gave none.
pub const FALLBACK_REASON: &str = "No reason given";

/// Issuer recorded for actions without a named staff actor.
pub const CONSOLE_ISSUER: &str = "Console";

/// Input for creating a punishment of any kind.
pub struct PunishmentInput {
    /// Who the punishment targets.
    pub subject: SubjectKey,
    /// Free-text reason; blank falls back to [`FALLBACK_REASON`].
    pub reason: Option<String>,
    /// Staff actor; blank falls back to [`CONSOLE_ISSUER`].
    pub issued_by: Option<String>,
    /// How long the punishment lasts. `None` or a non-positive duration
    /// means permanent. Ignored for kicks.
    pub duration: Option<Duration>,
}

impl PunishmentInput {
    /// Input targeting `subject` with everything else defaulted.
    #[must_use]
    pub const fn for_subject(subject: SubjectKey) -> Self {
        Self {
            subject,
            reason: None,
            issued_by: None,
            duration: None,
        }
    }
}

/// Punishment ledger service.
#[derive(Clone)]
pub struct PunishmentService {
    repo: PunishmentRepository,
    resolver: PunishmentResolver,
    config: ModerationConfig,
}

/// Build the row to insert for a new punishment.
///
/// Applies the shared creation contract: display-name synthesis, reason
/// and issuer fallbacks, and the expiry computation. Kicks are
/// point-in-time events and never carry an expiry; a non-positive
/// duration means permanent, never "already expired".
fn build_record(
    kind: PunishmentKind,
    input: &PunishmentInput,
    now: DateTime<FixedOffset>,
) -> AppResult<punishment::ActiveModel> {
    if input.subject.is_empty() {
        return Err(AppError::InvalidSubject(
            "no account id, display name or address supplied".to_string(),
        ));
    }

    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_REASON);
    let issued_by = input
        .issued_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(CONSOLE_ISSUER);

    let expires_at = if kind == PunishmentKind::Kick {
        None
    } else {
        input
            .duration
            .filter(|d| *d > Duration::zero())
            .map(|d| now + d)
    };

    Ok(punishment::ActiveModel {
        subject_account_id: Set(input.subject.account_id().map(ToString::to_string)),
        subject_display_name: Set(input.subject.display_name_or_synthesized()),
        subject_address: Set(input.subject.address().map(ToString::to_string)),
        kind: Set(kind),
        reason: Set(reason.to_string()),
        issued_by: Set(issued_by.to_string()),
        created_at: Set(now),
        expires_at: Set(expires_at),
        active: Set(true),
        ..Default::default()
    })
}

impl PunishmentService {
    /// Create a new punishment service with default listing limits.
    #[must_use]
    pub fn new(repo: PunishmentRepository) -> Self {
        Self::with_config(repo, ModerationConfig::default())
    }

    /// Create a new punishment service with configured listing limits.
    #[must_use]
    pub fn with_config(repo: PunishmentRepository, config: ModerationConfig) -> Self {
        let resolver = PunishmentResolver::new(repo.clone());
        Self {
            repo,
            resolver,
            config,
        }
    }

    /// The resolver backing this service, for gating collaborators that
    /// want restriction checks without the full ledger surface.
    #[must_use]
    pub const fn resolver(&self) -> &PunishmentResolver {
        &self.resolver
    }

    // ========== Creation ==========

    /// Record a ban keyed on the subject's account.
    pub async fn ban_account(&self, input: PunishmentInput) -> AppResult<punishment::Model> {
        self.create(PunishmentKind::AccountBan, input).await
    }

    /// Record a ban keyed on a network address.
    ///
    /// Fails with [`AppError::InvalidSubject`] when the input carries no
    /// address.
    pub async fn ban_address(&self, input: PunishmentInput) -> AppResult<punishment::Model> {
        if input.subject.address().is_none() {
            return Err(AppError::InvalidSubject(
                "address ban requires a network address".to_string(),
            ));
        }
        self.create(PunishmentKind::AddressBan, input).await
    }

    /// Record a mute.
    pub async fn mute(&self, input: PunishmentInput) -> AppResult<punishment::Model> {
        self.create(PunishmentKind::Mute, input).await
    }

    /// Record a warning.
    pub async fn warn(&self, input: PunishmentInput) -> AppResult<punishment::Model> {
        self.create(PunishmentKind::Warn, input).await
    }

    /// Record a kick. Kicks are history rows only: they never gate future
    /// admission and never carry a duration.
    pub async fn log_kick(&self, input: PunishmentInput) -> AppResult<punishment::Model> {
        self.create(PunishmentKind::Kick, input).await
    }

    async fn create(
        &self,
        kind: PunishmentKind,
        input: PunishmentInput,
    ) -> AppResult<punishment::Model> {
        let now = Utc::now().fixed_offset();
        let model = build_record(kind, &input, now)?;

        let created = self.repo.insert(model).await.inspect_err(|e| {
            error!(
                operation = "create",
                kind = ?kind,
                subject = %input.subject,
                error = %e,
                "Failed to persist punishment; the action did not happen"
            );
        })?;

        info!(
            id = created.id,
            kind = ?kind,
            subject = %created.subject_display_name,
            issued_by = %created.issued_by,
            permanent = created.expires_at.is_none(),
            "Recorded punishment"
        );

        Ok(created)
    }

    // ========== Gating ==========

    /// The ban currently gating `account_id` (or, failing that, `address`).
    ///
    /// The login collaborator renders a denial from the returned record's
    /// reason, issuer and [`Self::format_remaining`].
    pub async fn is_account_banned(
        &self,
        account_id: &str,
        address: Option<&str>,
    ) -> AppResult<Option<punishment::Model>> {
        self.resolver
            .resolve_account_ban(Some(account_id), address)
            .await
    }

    /// The mute currently gating `account_id`.
    pub async fn is_muted(&self, account_id: &str) -> AppResult<Option<punishment::Model>> {
        self.resolver.resolve_mute(account_id).await
    }

    // ========== Reversal ==========

    /// Lift the newest active ban matching `subject`.
    ///
    /// Tries the account-ban kind first, then address bans (an address-ban
    /// row is addressable by its synthesized `"IP <addr>"` name). Returns
    /// whether any row changed; `false` covers both "nothing to reverse"
    /// and "storage failed" - the fault is logged, the caller renders "no
    /// active restriction found" either way.
    pub async fn unban(&self, subject: &SubjectKey) -> bool {
        if self.reverse(PunishmentKind::AccountBan, subject).await {
            return true;
        }
        self.reverse(PunishmentKind::AddressBan, subject).await
    }

    /// Lift the newest active mute matching `subject`.
    pub async fn unmute(&self, subject: &SubjectKey) -> bool {
        self.reverse(PunishmentKind::Mute, subject).await
    }

    async fn reverse(&self, kind: PunishmentKind, subject: &SubjectKey) -> bool {
        match self.try_reverse(kind, subject).await {
            Ok(changed) => changed,
            Err(e) => {
                error!(
                    operation = "reverse",
                    kind = ?kind,
                    subject = %subject,
                    error = %e,
                    "Reversal failed; reporting no change"
                );
                false
            }
        }
    }

    /// Deactivate the newest active row of `kind` matching the subject.
    ///
    /// Subject resolution order: account id, then address, then display
    /// name.
    async fn try_reverse(&self, kind: PunishmentKind, subject: &SubjectKey) -> AppResult<bool> {
        let mut found = self
            .repo
            .find_latest_active(kind, subject.account_id(), subject.address())
            .await?;

        if found.is_none() {
            if let Some(name) = subject.display_name() {
                found = self.repo.find_latest_active_by_name(kind, name).await?;
            }
        }

        let Some(found) = found else {
            return Ok(false);
        };

        self.repo.set_active(found.id, false).await?;
        info!(
            id = found.id,
            kind = ?kind,
            subject = %found.subject_display_name,
            "Reversed punishment"
        );
        Ok(true)
    }

    // ========== Warnings ==========

    /// Count the active warnings on a subject.
    pub async fn count_warnings(&self, subject: &SubjectKey) -> AppResult<u64> {
        self.repo
            .count_warnings(subject.account_id(), subject.display_name())
            .await
    }

    /// List the active warnings on a subject, newest first.
    ///
    /// `limit` falls back to the configured history limit.
    pub async fn list_warnings(
        &self,
        subject: &SubjectKey,
        limit: Option<u64>,
    ) -> AppResult<Vec<punishment::Model>> {
        self.repo
            .find_warnings(
                subject.account_id(),
                subject.display_name(),
                limit.unwrap_or(self.config.history_limit),
            )
            .await
    }

    /// Deactivate the single newest warning on a subject and return it.
    pub async fn clear_newest_warning(
        &self,
        subject: &SubjectKey,
        cleared_by: &str,
    ) -> AppResult<Option<punishment::Model>> {
        let newest = self
            .repo
            .find_warnings(subject.account_id(), subject.display_name(), 1)
            .await?
            .into_iter()
            .next();

        let Some(newest) = newest else {
            return Ok(None);
        };

        self.repo.set_active(newest.id, false).await?;
        info!(
            id = newest.id,
            subject = %newest.subject_display_name,
            cleared_by = %cleared_by,
            "Cleared newest warning"
        );
        Ok(Some(newest))
    }

    /// Remove all warning rows for a subject. Returns rows removed.
    pub async fn clear_all_warnings(
        &self,
        subject: &SubjectKey,
        cleared_by: &str,
    ) -> AppResult<u64> {
        let removed = self
            .repo
            .delete_warnings(subject.account_id(), subject.display_name())
            .await?;

        if removed > 0 {
            info!(
                removed,
                subject = %subject,
                cleared_by = %cleared_by,
                "Cleared all warnings"
            );
        }
        Ok(removed)
    }

    // ========== History ==========

    /// Full punishment history for a subject, all kinds, newest first.
    ///
    /// `limit` falls back to the configured history limit.
    pub async fn history(
        &self,
        subject: &SubjectKey,
        limit: Option<u64>,
    ) -> AppResult<Vec<punishment::Model>> {
        self.repo
            .find_by_subject(
                subject.account_id(),
                subject.display_name(),
                limit.unwrap_or(self.config.history_limit),
            )
            .await
    }

    /// Subject names matching a prefix, for command tab-completion. Row
    /// count is bounded by the configured autocomplete limit.
    pub async fn complete_names(&self, prefix: &str) -> AppResult<Vec<String>> {
        self.repo
            .search_names_by_prefix(prefix, self.config.autocomplete_limit)
            .await
    }

    // ========== Formatting ==========

    /// Render the time remaining on a record: `"permanent"` without an
    /// expiry, else a compact `"<d>d <h>h <m>m <s>s"`.
    #[must_use]
    pub fn format_remaining(record: &punishment::Model) -> String {
        format_remaining_at(record.expires_at, Utc::now().fixed_offset())
    }
}
