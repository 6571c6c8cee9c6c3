//! Row-level read operations for the warehouse

use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};

use super::Warehouse;
use super::converters::{model_to_cookie_view, model_to_tracker_view};
use super::mutations::never_labeled;
use super::retry;
use crate::errors::{PrivacyShieldError, Result};
use crate::storage::{CookieView, TrackerView, UnenrichedTracker, UserScope};

use migration::entities::{blocklist_entry, cookie_event, tracker_event};

impl Warehouse {
    /// 用户屏蔽的域名，按添加时间排序
    pub async fn get_blocklist(&self, user_email: &str) -> Result<Vec<String>> {
        let db = &self.db;
        let entries = retry::with_retry("get_blocklist", self.retry_config, || async {
            blocklist_entry::Entity::find()
                .filter(blocklist_entry::Column::UserEmail.eq(user_email))
                .order_by_asc(blocklist_entry::Column::CreatedAt)
                .order_by_asc(blocklist_entry::Column::Id)
                .all(db)
                .await
        })
        .await
        .map_err(|e| PrivacyShieldError::database_operation(format!("Failed to load blocklist: {}", e)))?;

        Ok(entries.into_iter().map(|e| e.domain).collect())
    }

    pub(super) async fn blocklist_contains(&self, domain: &str, user_email: &str) -> Result<bool> {
        let count = blocklist_entry::Entity::find()
            .filter(blocklist_entry::Column::Domain.eq(domain))
            .filter(blocklist_entry::Column::UserEmail.eq(user_email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// 从未被标注过的 tracker（最旧的优先）
    ///
    /// 回填查不到时写入 `Unknown`，这些行不会再被选中，也不会再被改写。
    pub async fn get_unenriched_trackers(&self, limit: u64) -> Result<Vec<UnenrichedTracker>> {
        let db = &self.db;
        let rows: Vec<(i64, String, Option<String>)> =
            retry::with_retry("get_unenriched_trackers", self.retry_config, || async {
                tracker_event::Entity::find()
                    .select_only()
                    .column(tracker_event::Column::Id)
                    .column(tracker_event::Column::Domain)
                    .column(tracker_event::Column::Company)
                    .filter(never_labeled())
                    .order_by_asc(tracker_event::Column::Id)
                    .limit(limit)
                    .into_tuple()
                    .all(db)
                    .await
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, domain, company)| UnenrichedTracker {
                id,
                domain,
                company,
            })
            .collect())
    }

    /// 最近的 tracker 事件
    pub async fn get_trackers(&self, scope: &UserScope, limit: u64) -> Result<Vec<TrackerView>> {
        let db = &self.db;
        let models = retry::with_retry("get_trackers", self.retry_config, || async {
            tracker_event::Entity::find()
                .apply_if(scope.email(), |q, email| {
                    q.filter(tracker_event::Column::UserEmail.eq(email))
                })
                .order_by_desc(tracker_event::Column::DetectedAt)
                .order_by_desc(tracker_event::Column::Id)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_tracker_view).collect())
    }

    /// 最近的 cookie 事件
    pub async fn get_cookies(&self, scope: &UserScope, limit: u64) -> Result<Vec<CookieView>> {
        let db = &self.db;
        let models = retry::with_retry("get_cookies", self.retry_config, || async {
            cookie_event::Entity::find()
                .apply_if(scope.email(), |q, email| {
                    q.filter(cookie_event::Column::UserEmail.eq(email))
                })
                .order_by_desc(cookie_event::Column::DetectedAt)
                .order_by_desc(cookie_event::Column::Id)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_cookie_view).collect())
    }
}
