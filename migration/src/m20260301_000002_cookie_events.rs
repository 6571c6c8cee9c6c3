//! Cookie 事件表迁移

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CookieEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CookieEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::CookieName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CookieEvents::Domain).string_len(255).not_null())
                    .col(
                        ColumnDef::new(CookieEvents::Path)
                            .string_len(500)
                            .not_null()
                            .default("/"),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::SetBy)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::Initiator)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::IsThirdParty)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::IsTracker)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::IsPersistent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::Secure)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::HttpOnly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::SameSite)
                            .string_len(20)
                            .not_null()
                            .default("None"),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::ExpirationDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(CookieEvents::Company).string_len(255).null())
                    .col(ColumnDef::new(CookieEvents::Category).string_len(100).null())
                    .col(
                        ColumnDef::new(CookieEvents::Classification)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::UserEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::DeviceId)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::PageUrl)
                            .string_len(1000)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CookieEvents::DetectedAt)
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
                    .name("idx_cookie_events_user_time")
                    .table(CookieEvents::Table)
                    .col(CookieEvents::UserEmail)
                    .col(CookieEvents::DetectedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_cookie_events_user_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CookieEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CookieEvents {
    #[sea_orm(iden = "cookie_events")]
    Table,
    Id,
    CookieName,
    Domain,
    Path,
    SetBy,
    Initiator,
    IsThirdParty,
    IsTracker,
    IsPersistent,
    Secure,
    HttpOnly,
    SameSite,
    ExpirationDate,
    Company,
    Category,
    Classification,
    UserEmail,
    DeviceId,
    PageUrl,
    DetectedAt,
}
