//! 追踪器事件表迁移
//!
//! 创建 tracker_events 表，存储扩展上报的第三方请求：
//! - 域名、完整 URL、发起站点
//! - 公司 / 分类（可为空，由富化回填）
//! - 所属用户与设备

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackerEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackerEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::Domain)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackerEvents::FullUrl).text().not_null())
                    .col(
                        ColumnDef::new(TrackerEvents::RequestType)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::Initiator)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::IsThirdParty)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::IsKnownTracker)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::IsBlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TrackerEvents::Company).string_len(255).null())
                    .col(ColumnDef::new(TrackerEvents::Category).string_len(100).null())
                    .col(
                        ColumnDef::new(TrackerEvents::DetectionSource)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::Occurrences)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::UserEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::DeviceId)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::FirstSeen)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::LastSeen)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TrackerEvents::DetectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按用户 + 时间查询（仪表盘的主要访问路径）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracker_events_user_time")
                    .table(TrackerEvents::Table)
                    .col(TrackerEvents::UserEmail)
                    .col(TrackerEvents::DetectedAt)
                    .to_owned(),
            )
            .await?;

        // 富化回填按公司字段扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracker_events_company")
                    .table(TrackerEvents::Table)
                    .col(TrackerEvents::Company)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tracker_events_company").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_tracker_events_user_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TrackerEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackerEvents {
    #[sea_orm(iden = "tracker_events")]
    Table,
    Id,
    Domain,
    FullUrl,
    RequestType,
    Initiator,
    IsThirdParty,
    IsKnownTracker,
    IsBlocked,
    Company,
    Category,
    DetectionSource,
    Occurrences,
    UserEmail,
    DeviceId,
    FirstSeen,
    LastSeen,
    DetectedAt,
}
