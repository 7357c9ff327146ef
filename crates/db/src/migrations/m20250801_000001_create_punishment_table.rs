//! Create punishment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Punishment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Punishment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Punishment::SubjectAccountId).string_len(64))
                    .col(
                        ColumnDef::new(Punishment::SubjectDisplayName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Punishment::SubjectAddress).string_len(64))
                    .col(ColumnDef::new(Punishment::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Punishment::Reason).text().not_null())
                    .col(ColumnDef::new(Punishment::IssuedBy).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Punishment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Punishment::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Punishment::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (subject_account_id, kind, active) - account-first resolver lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_punishment_account_kind_active")
                    .table(Punishment::Table)
                    .col(Punishment::SubjectAccountId)
                    .col(Punishment::Kind)
                    .col(Punishment::Active)
                    .to_owned(),
            )
            .await?;

        // Index: (subject_address, kind, active) - address fallback lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_punishment_address_kind_active")
                    .table(Punishment::Table)
                    .col(Punishment::SubjectAddress)
                    .col(Punishment::Kind)
                    .col(Punishment::Active)
                    .to_owned(),
            )
            .await?;

        // Index: subject_display_name (for staff search and autocomplete)
        manager
            .create_index(
                Index::create()
                    .name("idx_punishment_display_name")
                    .table(Punishment::Table)
                    .col(Punishment::SubjectDisplayName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Punishment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Punishment {
    Table,
    Id,
    SubjectAccountId,
    SubjectDisplayName,
    SubjectAddress,
    Kind,
    Reason,
    IssuedBy,
    CreatedAt,
    ExpiresAt,
    Active,
}
