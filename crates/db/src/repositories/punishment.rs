//! Punishment repository for database operations.
//!
//! All display-name comparisons are case-insensitive: moderation subjects
//! are frequently typed by staff from memory.

use std::sync::Arc;

use crate::entities::{
    punishment::{self, PunishmentKind},
    Punishment,
};
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use warden_common::{AppError, AppResult};

/// Punishment repository for database operations.
#[derive(Clone)]
pub struct PunishmentRepository {
    db: Arc<DatabaseConnection>,
}

/// Case-insensitive display-name equality.
fn name_eq(display_name: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(
        punishment::Column::SubjectDisplayName,
    )))
    .eq(display_name.to_lowercase())
}

/// Subject match over account id (exact) or display name (case-insensitive).
///
/// Returns `None` when no component was supplied; callers treat that as an
/// empty result set rather than an unfiltered scan.
fn subject_condition(account_id: Option<&str>, display_name: Option<&str>) -> Option<Condition> {
    let mut condition = Condition::any();
    let mut has_component = false;

    if let Some(account_id) = account_id {
        condition = condition.add(punishment::Column::SubjectAccountId.eq(account_id));
        has_component = true;
    }
    if let Some(display_name) = display_name {
        condition = condition.add(name_eq(display_name));
        has_component = true;
    }

    has_component.then_some(condition)
}

impl PunishmentRepository {
    /// Create a new punishment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new punishment row and return it with its assigned id.
    ///
    /// An insert failure means the action did not happen; there is no
    /// partial success.
    pub async fn insert(&self, model: punishment::ActiveModel) -> AppResult<punishment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the stored `active` flag of a row. Idempotent.
    pub async fn set_active(&self, id: i64, active: bool) -> AppResult<()> {
        Punishment::update_many()
            .col_expr(punishment::Column::Active, Expr::value(active))
            .filter(punishment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Find the newest row of `kind` with `active=true` for a subject.
    ///
    /// The account-id lookup runs first; the address lookup only runs when
    /// the account lookup yielded nothing. Newest means
    /// `ORDER BY created_at DESC, id DESC` - when racing writers leave
    /// several active rows for one subject, the newest one is authoritative.
    pub async fn find_latest_active(
        &self,
        kind: PunishmentKind,
        account_id: Option<&str>,
        address: Option<&str>,
    ) -> AppResult<Option<punishment::Model>> {
        if let Some(account_id) = account_id {
            let found = self
                .find_latest_active_matching(
                    kind,
                    punishment::Column::SubjectAccountId.eq(account_id),
                )
                .await?;
            if found.is_some() {
                return Ok(found);
            }
        }

        if let Some(address) = address {
            return self
                .find_latest_active_matching(kind, punishment::Column::SubjectAddress.eq(address))
                .await;
        }

        Ok(None)
    }

    /// Find the newest active row of `kind` matching a display name.
    ///
    /// Reversal commands address subjects by the name staff typed.
    pub async fn find_latest_active_by_name(
        &self,
        kind: PunishmentKind,
        display_name: &str,
    ) -> AppResult<Option<punishment::Model>> {
        self.find_latest_active_matching(kind, name_eq(display_name))
            .await
    }

    async fn find_latest_active_matching(
        &self,
        kind: PunishmentKind,
        subject: SimpleExpr,
    ) -> AppResult<Option<punishment::Model>> {
        Punishment::find()
            .filter(punishment::Column::Kind.eq(kind))
            .filter(punishment::Column::Active.eq(true))
            .filter(subject)
            .order_by_desc(punishment::Column::CreatedAt)
            .order_by_desc(punishment::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full punishment history for a subject, all kinds, newest first.
    pub async fn find_by_subject(
        &self,
        account_id: Option<&str>,
        display_name: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<punishment::Model>> {
        let Some(condition) = subject_condition(account_id, display_name) else {
            return Ok(Vec::new());
        };

        Punishment::find()
            .filter(condition)
            .order_by_desc(punishment::Column::CreatedAt)
            .order_by_desc(punishment::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active, unexpired warnings for a subject, newest first.
    ///
    /// Warnings expire like other punishments, but no resolver path ever
    /// reads them one at a time, so the stored flag on an expired warning
    /// is never corrected. Filtering on `expires_at` here keeps expired
    /// rows out of counts without a write.
    pub async fn find_warnings(
        &self,
        account_id: Option<&str>,
        display_name: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<punishment::Model>> {
        let Some(condition) = subject_condition(account_id, display_name) else {
            return Ok(Vec::new());
        };

        Punishment::find()
            .filter(punishment::Column::Kind.eq(PunishmentKind::Warn))
            .filter(punishment::Column::Active.eq(true))
            .filter(
                punishment::Column::ExpiresAt
                    .is_null()
                    .or(punishment::Column::ExpiresAt.gt(Utc::now().fixed_offset())),
            )
            .filter(condition)
            .order_by_desc(punishment::Column::CreatedAt)
            .order_by_desc(punishment::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active, unexpired warnings for a subject.
    pub async fn count_warnings(
        &self,
        account_id: Option<&str>,
        display_name: Option<&str>,
    ) -> AppResult<u64> {
        let Some(condition) = subject_condition(account_id, display_name) else {
            return Ok(0);
        };

        Punishment::find()
            .filter(punishment::Column::Kind.eq(PunishmentKind::Warn))
            .filter(punishment::Column::Active.eq(true))
            .filter(
                punishment::Column::ExpiresAt
                    .is_null()
                    .or(punishment::Column::ExpiresAt.gt(Utc::now().fixed_offset())),
            )
            .filter(condition)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Hard-delete all warning rows for a subject. Returns rows removed.
    ///
    /// The only hard-delete path in the punishment store.
    pub async fn delete_warnings(
        &self,
        account_id: Option<&str>,
        display_name: Option<&str>,
    ) -> AppResult<u64> {
        let Some(condition) = subject_condition(account_id, display_name) else {
            return Ok(0);
        };

        let result = Punishment::delete_many()
            .filter(punishment::Column::Kind.eq(PunishmentKind::Warn))
            .filter(condition)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Distinct subject display names, optionally filtered by kind and
    /// stored activity flag. Feeds staff listing commands.
    pub async fn distinct_subject_names(
        &self,
        kind: Option<PunishmentKind>,
        active: Option<bool>,
    ) -> AppResult<Vec<String>> {
        let mut query = Punishment::find()
            .select_only()
            .column(punishment::Column::SubjectDisplayName)
            .distinct();

        if let Some(kind) = kind {
            query = query.filter(punishment::Column::Kind.eq(kind));
        }
        if let Some(active) = active {
            query = query.filter(punishment::Column::Active.eq(active));
        }

        query
            .order_by_asc(punishment::Column::SubjectDisplayName)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive display-name prefix search. Feeds tab-completion.
    pub async fn search_names_by_prefix(
        &self,
        prefix: &str,
        limit: u64,
    ) -> AppResult<Vec<String>> {
        let pattern = format!("{}%", prefix.to_lowercase().replace(['%', '_'], ""));

        Punishment::find()
            .select_only()
            .column(punishment::Column::SubjectDisplayName)
            .distinct()
            .filter(
                Expr::expr(Func::lower(Expr::col(
                    punishment::Column::SubjectDisplayName,
                )))
                .like(pattern),
            )
            .order_by_asc(punishment::Column::SubjectDisplayName)
            .limit(limit)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
