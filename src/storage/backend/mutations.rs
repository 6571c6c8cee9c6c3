//! Write operations for the warehouse
//!
//! Batch inserts run inside a single transaction; a failing row rolls back the
//! whole call. Writes are not retried.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, TransactionTrait};
use tracing::{debug, info};

use super::Warehouse;
use super::converters::{cookie_to_active_model, tracker_to_active_model, truncate_chars};
use crate::errors::{PrivacyShieldError, Result};
use crate::storage::{CookieUpload, TrackerUpload};

use migration::entities::{blocklist_entry, tracker_event};

impl Warehouse {
    /// 插入一批 tracker 事件，返回插入行数
    pub async fn insert_trackers(
        &self,
        trackers: &[TrackerUpload],
        user_email: &str,
        device_id: &str,
    ) -> Result<u64> {
        if trackers.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let txn = self.db.begin().await.map_err(|e| {
            PrivacyShieldError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        for tracker in trackers {
            let model = tracker_to_active_model(tracker, user_email, device_id, now);
            // 出错时 txn 被 drop，自动回滚
            tracker_event::Entity::insert(model)
                .exec(&txn)
                .await
                .map_err(|e| {
                    PrivacyShieldError::database_operation(format!(
                        "Failed to insert tracker '{}': {}",
                        tracker.domain, e
                    ))
                })?;
        }

        txn.commit().await.map_err(|e| {
            PrivacyShieldError::database_operation(format!("Failed to commit trackers: {}", e))
        })?;

        info!(
            "Inserted {} trackers for device {}",
            trackers.len(),
            device_id
        );
        Ok(trackers.len() as u64)
    }

    /// 插入一批 cookie 事件，返回插入行数
    pub async fn insert_cookies(
        &self,
        cookies: &[CookieUpload],
        user_email: &str,
        device_id: &str,
    ) -> Result<u64> {
        if cookies.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let txn = self.db.begin().await.map_err(|e| {
            PrivacyShieldError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        for cookie in cookies {
            let model = cookie_to_active_model(cookie, user_email, device_id, now);
            migration::entities::cookie_event::Entity::insert(model)
                .exec(&txn)
                .await
                .map_err(|e| {
                    PrivacyShieldError::database_operation(format!(
                        "Failed to insert cookie '{}': {}",
                        cookie.name, e
                    ))
                })?;
        }

        txn.commit().await.map_err(|e| {
            PrivacyShieldError::database_operation(format!("Failed to commit cookies: {}", e))
        })?;

        info!("Inserted {} cookies for device {}", cookies.len(), device_id);
        Ok(cookies.len() as u64)
    }

    /// 加入屏蔽列表；已存在时返回 false
    pub async fn add_to_blocklist(&self, domain: &str, user_email: &str, reason: &str) -> Result<bool> {
        let domain = truncate_chars(domain, 255);
        let user_email = truncate_chars(user_email, 255);

        if self.blocklist_contains(&domain, &user_email).await? {
            return Ok(false);
        }

        let entry = blocklist_entry::ActiveModel {
            id: NotSet,
            domain: Set(domain.clone()),
            user_email: Set(user_email.clone()),
            reason: Set(truncate_chars(reason, 255)),
            created_at: Set(Utc::now()),
        };

        match blocklist_entry::Entity::insert(entry).exec(&self.db).await {
            Ok(_) => {
                info!("Blocklist: added {} for {}", domain, user_email);
                Ok(true)
            }
            // 并发添加撞上唯一索引时，视为已存在
            Err(e) => {
                if self.blocklist_contains(&domain, &user_email).await? {
                    debug!("Blocklist: concurrent insert of {} resolved as duplicate", domain);
                    Ok(false)
                } else {
                    Err(PrivacyShieldError::database_operation(format!(
                        "Failed to add blocklist entry: {}",
                        e
                    )))
                }
            }
        }
    }

    /// 移出屏蔽列表；不存在时返回 false
    pub async fn remove_from_blocklist(&self, domain: &str, user_email: &str) -> Result<bool> {
        let domain = truncate_chars(domain, 255);
        let user_email = truncate_chars(user_email, 255);

        let result = blocklist_entry::Entity::delete_many()
            .filter(blocklist_entry::Column::Domain.eq(domain.as_str()))
            .filter(blocklist_entry::Column::UserEmail.eq(user_email.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| {
                PrivacyShieldError::database_operation(format!(
                    "Failed to remove blocklist entry: {}",
                    e
                ))
            })?;

        if result.rows_affected > 0 {
            info!("Blocklist: removed {} for {}", domain, user_email);
        }
        Ok(result.rows_affected > 0)
    }

    /// 回填公司/分类
    ///
    /// UPDATE 带"从未标注"谓词，任何非空标签（包括 `Unknown`）都不会被覆盖。
    /// 返回是否真的更新了。
    pub async fn update_enriched_tracker(
        &self,
        id: i64,
        company: &str,
        category: &str,
    ) -> Result<bool> {
        let result = tracker_event::Entity::update_many()
            .col_expr(
                tracker_event::Column::Company,
                Expr::value(truncate_chars(company, 255)),
            )
            .col_expr(
                tracker_event::Column::Category,
                Expr::value(truncate_chars(category, 100)),
            )
            .filter(tracker_event::Column::Id.eq(id))
            .filter(never_labeled())
            .exec(&self.db)
            .await
            .map_err(|e| {
                PrivacyShieldError::database_operation(format!(
                    "Failed to update tracker {}: {}",
                    id, e
                ))
            })?;

        Ok(result.rows_affected > 0)
    }
}

/// company IS NULL OR company = ''
pub(super) fn never_labeled() -> Condition {
    Condition::any()
        .add(tracker_event::Column::Company.is_null())
        .add(tracker_event::Column::Company.eq(""))
}
