//! Cookie event entity: one detected cookie

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "cookie_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub cookie_name: String,
    pub domain: String,
    pub path: String,
    pub set_by: String,
    pub initiator: String,
    pub is_third_party: bool,
    pub is_tracker: bool,
    pub is_persistent: bool,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
    pub expiration_date: Option<DateTimeUtc>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub classification: String,
    pub user_email: String,
    pub device_id: String,
    pub page_url: String,
    pub detected_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
