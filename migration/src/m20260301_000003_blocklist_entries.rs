//! 屏蔽列表表迁移
//!
//! (domain, user_email) 唯一，保证重复添加是幂等的

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlocklistEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlocklistEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlocklistEntries::Domain)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlocklistEntries::UserEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlocklistEntries::Reason)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(BlocklistEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uniq_blocklist_domain_user")
                    .table(BlocklistEntries::Table)
                    .col(BlocklistEntries::Domain)
                    .col(BlocklistEntries::UserEmail)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_blocklist_domain_user").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BlocklistEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BlocklistEntries {
    #[sea_orm(iden = "blocklist_entries")]
    Table,
    Id,
    Domain,
    UserEmail,
    Reason,
    CreatedAt,
}
