//! AI security report and dashboard summary

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

use super::DashboardService;
use crate::ai::prompt::{MAX_REPORT_DOMAINS, security_report_prompt, summary_prompt};
use crate::ai::{SecurityReport, TextGenerator, parse_security_report};
use crate::errors::{PrivacyShieldError, Result};
use crate::storage::{UserScope, Warehouse};

const DEFAULT_REPORT_DAYS: i64 = 7;

/// 解析 `start_date`（YYYY-MM-DD）；缺省为今天往前 7 天
pub fn resolve_start_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today - Duration::days(DEFAULT_REPORT_DAYS)),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            PrivacyShieldError::date_parse(format!(
                "Invalid start_date '{}', expected YYYY-MM-DD",
                s
            ))
        }),
    }
}

pub struct ReportService {
    warehouse: Option<Arc<Warehouse>>,
    generator: Option<Arc<dyn TextGenerator>>,
    dashboard: Arc<DashboardService>,
}

impl ReportService {
    pub fn new(
        warehouse: Option<Arc<Warehouse>>,
        generator: Option<Arc<dyn TextGenerator>>,
        dashboard: Arc<DashboardService>,
    ) -> Self {
        Self {
            warehouse,
            generator,
            dashboard,
        }
    }

    pub fn ai_configured(&self) -> bool {
        self.generator.is_some()
    }

    fn generator(&self) -> Result<&dyn TextGenerator> {
        self.generator
            .as_deref()
            .ok_or_else(|| PrivacyShieldError::ai_unavailable("GEMINI_API_KEY not configured"))
    }

    /// 区间内没有 tracker 时直接返回干净报告，不调用模型
    pub async fn security_report(
        &self,
        scope: &UserScope,
        start_date: Option<&str>,
    ) -> Result<SecurityReport> {
        let warehouse = self
            .warehouse
            .as_deref()
            .ok_or_else(|| PrivacyShieldError::warehouse_unavailable("Database not available"))?;

        let start = resolve_start_date(start_date, Utc::now().date_naive())?;
        let start_label = start.format("%Y-%m-%d").to_string();
        let since = start.and_time(NaiveTime::MIN).and_utc();

        let data = warehouse
            .security_report_data(scope, since, MAX_REPORT_DOMAINS as u64)
            .await?;
        if data.domain_stats.is_empty() {
            info!("Security report for {} since {}: no data", scope.label(), start_label);
            return Ok(SecurityReport::clean());
        }

        let generator = self.generator()?;
        let prompt = security_report_prompt(&start_label, &data);
        info!(
            "Security report for {} since {}: {} domains via {}",
            scope.label(),
            start_label,
            data.domain_stats.len(),
            generator.name()
        );

        let raw = generator.generate(&prompt).await?;
        parse_security_report(&raw).inspect_err(|e| {
            warn!("Failed to parse {} response ({}): {}", generator.name(), e, raw);
        })
    }

    pub async fn summary(&self, scope: &UserScope) -> Result<String> {
        let input = self.dashboard.summary_input(scope).await?;
        let generator = self.generator()?;

        let text = generator.generate(&summary_prompt(&input)).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_resolve_start_date() {
        let today = day("2026-03-10");
        assert_eq!(resolve_start_date(None, today).unwrap(), day("2026-03-03"));
        assert_eq!(resolve_start_date(Some(""), today).unwrap(), day("2026-03-03"));
        assert_eq!(
            resolve_start_date(Some("2026-01-15"), today).unwrap(),
            day("2026-01-15")
        );

        let err = resolve_start_date(Some("15/01/2026"), today).unwrap_err();
        assert!(matches!(err, PrivacyShieldError::DateParse(_)));
        assert_eq!(err.http_status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_warehouse_checked_first() {
        let dashboard = Arc::new(DashboardService::new(None, Default::default()));
        let service = ReportService::new(None, None, dashboard);
        assert!(!service.ai_configured());

        let scope = UserScope::User("a@b.c".to_string());
        let err = service.security_report(&scope, None).await.unwrap_err();
        assert!(matches!(err, PrivacyShieldError::WarehouseUnavailable(_)));
        assert!(service.summary(&scope).await.unwrap_err().is_unavailable());
    }
}
