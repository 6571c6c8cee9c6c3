//! Upload ingestion and enrichment backfill

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::enrichment::{EnrichmentRecord, TrackerMatcher, UNKNOWN};
use crate::errors::{PrivacyShieldError, Result};
use crate::storage::{CookieUpload, TrackerUpload, Warehouse};

/// 一次上传的写入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub cookies_inserted: u64,
    pub trackers_inserted: u64,
}

/// 回填统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub scanned: usize,
    pub updated: usize,
    pub failed: usize,
}

fn require_identity(email: &str, device_id: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(PrivacyShieldError::validation("email is required"));
    }
    if device_id.trim().is_empty() {
        return Err(PrivacyShieldError::validation("deviceId is required"));
    }
    Ok(())
}

pub struct IngestService {
    warehouse: Option<Arc<Warehouse>>,
    matcher: Option<Arc<TrackerMatcher>>,
    backfill_batch_size: u64,
}

impl IngestService {
    pub fn new(
        warehouse: Option<Arc<Warehouse>>,
        matcher: Option<Arc<TrackerMatcher>>,
        backfill_batch_size: u64,
    ) -> Self {
        Self {
            warehouse,
            matcher,
            backfill_batch_size,
        }
    }

    fn warehouse(&self) -> Result<&Warehouse> {
        self.warehouse
            .as_deref()
            .ok_or_else(|| PrivacyShieldError::warehouse_unavailable("Database not available"))
    }

    /// 写入 cookies 与 trackers，随后尽力回填公司标签
    pub async fn upload(
        &self,
        email: &str,
        device_id: &str,
        trackers: &[TrackerUpload],
        cookies: &[CookieUpload],
    ) -> Result<UploadOutcome> {
        require_identity(email, device_id)?;
        let email = email.trim();
        let device_id = device_id.trim();
        let warehouse = self.warehouse()?;

        if trackers.is_empty() && cookies.is_empty() {
            debug!("Upload from {} is empty, nothing to write", device_id);
            return Ok(UploadOutcome::default());
        }

        let cookies_inserted = warehouse.insert_cookies(cookies, email, device_id).await?;
        let trackers_inserted = warehouse.insert_trackers(trackers, email, device_id).await?;

        info!(
            "Upload from {} ({}): {} trackers, {} cookies",
            email, device_id, trackers_inserted, cookies_inserted
        );

        if trackers_inserted > 0 {
            // 回填失败不影响本次上传结果
            match self.backfill().await {
                Ok(report) if report.scanned > 0 => debug!(
                    "Backfill after upload: {}/{} labeled, {} failed",
                    report.updated, report.scanned, report.failed
                ),
                Ok(_) => {}
                Err(e) => warn!("Backfill after upload skipped: {}", e),
            }
        }

        Ok(UploadOutcome {
            cookies_inserted,
            trackers_inserted,
        })
    }

    /// 单独上传 cookies
    pub async fn upload_cookies(
        &self,
        email: &str,
        device_id: &str,
        cookies: &[CookieUpload],
    ) -> Result<u64> {
        require_identity(email, device_id)?;
        let warehouse = self.warehouse()?;
        if cookies.is_empty() {
            return Ok(0);
        }
        warehouse
            .insert_cookies(cookies, email.trim(), device_id.trim())
            .await
    }

    /// 给尚未标注的 tracker 补上公司/分类
    ///
    /// 未命中的记录写入 `Unknown`，下次不会再被选中。单行失败只记日志。
    pub async fn backfill(&self) -> Result<BackfillReport> {
        let Some(matcher) = self.matcher.as_deref() else {
            return Err(PrivacyShieldError::enrichment_unavailable(
                "Enrichment is disabled",
            ));
        };
        let warehouse = self.warehouse()?;

        let pending = warehouse
            .get_unenriched_trackers(self.backfill_batch_size.max(1))
            .await?;
        let mut report = BackfillReport {
            scanned: pending.len(),
            ..Default::default()
        };

        for row in pending {
            let enriched = matcher.enrich(EnrichmentRecord {
                domain: row.domain,
                company: row.company,
                category: None,
            });
            let company = enriched.company.as_deref().unwrap_or(UNKNOWN);
            let category = enriched.category.as_deref().unwrap_or(UNKNOWN);

            match warehouse.update_enriched_tracker(row.id, company, category).await {
                Ok(true) => report.updated += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!("Backfill of tracker {} failed: {}", row.id, e);
                }
            }
        }

        Ok(report)
    }
}
