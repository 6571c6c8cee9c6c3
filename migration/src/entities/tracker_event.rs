//! Tracker event entity: one detected third-party request

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tracker_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub domain: String,
    #[sea_orm(column_type = "Text")]
    pub full_url: String,
    pub request_type: String,
    pub initiator: String,
    pub is_third_party: bool,
    pub is_known_tracker: bool,
    pub is_blocked: bool,
    /// Owning company; NULL/empty until the extension or the backfill labels it
    pub company: Option<String>,
    pub category: Option<String>,
    pub detection_source: String,
    pub occurrences: i64,
    pub user_email: String,
    pub device_id: String,
    pub first_seen: Option<DateTimeUtc>,
    pub last_seen: Option<DateTimeUtc>,
    pub detected_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
