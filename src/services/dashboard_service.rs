//! Dashboard aggregation service
//!
//! Reads aggregates from the warehouse and reshapes them into the camelCase
//! view models the dashboard pages consume.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::padding::{
    COOKIE_TREND_PLACEHOLDER, OVERVIEW_PLACEHOLDER, PaddedPoint, TRACKER_TREND_PLACEHOLDER,
    pad_daily, utc_today, window_start,
};
use crate::ai::prompt::SummaryInput;
use crate::config::DashboardConfig;
use crate::errors::{PrivacyShieldError, Result};
use crate::storage::{
    CategoryCount, CategoryHits, CompanyHits, CompanyStat, CompanyWeekHits, CookieStats,
    CookieView, DomainCount, InitiatorCount, MonthlyTrackerRow, TrackerView, UserScope, Warehouse,
};

const OVERVIEW_DAYS: u32 = 7;
const DEFAULT_TREND_DAYS: i64 = 7;
const TOP_N: u64 = 10;
const INSIGHT_TOP_N: usize = 5;
const INSIGHT_MONTHS: usize = 6;
/// 上周为 0 时的"增长率"哨兵值
pub const NEW_COMPANY_CHANGE: f64 = 999.9;

// ============ 视图模型 ============

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPoint {
    pub date: String,
    pub value: i64,
    pub is_real: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_events: i64,
    pub unique_sites: i64,
    pub total_trackers: i64,
    pub total_cookies: i64,
    pub time_series: Vec<OverviewPoint>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub count: i64,
    pub is_real: bool,
}

impl From<PaddedPoint> for TrendPoint {
    fn from(p: PaddedPoint) -> Self {
        Self {
            date: p.date,
            count: p.count,
            is_real: p.is_real,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub tracker_daily: Vec<TrendPoint>,
    pub cookie_daily: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedDomain {
    pub domain: String,
    pub category: String,
    pub total_hits: i64,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyGroup {
    pub company: String,
    pub domains: Vec<GroupedDomain>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub total_trackers: i64,
    pub top_by_initiator: Vec<InitiatorCount>,
    pub top_by_domain: Vec<DomainCount>,
    pub company_groups: Vec<CompanyGroup>,
    pub all_trackers: Vec<TrackerView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CookiesPage {
    pub cookies: Vec<CookieView>,
    pub stats: CookieStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackerHistory {
    pub trackers: Vec<TrackerView>,
    pub stats: Vec<CompanyStat>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverWeek {
    pub company: String,
    pub last_week: i64,
    pub week_before: i64,
    pub percent_change: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPrivacy {
    pub month: String,
    pub unique_trackers: i64,
    pub total_tracking: i64,
    pub prev_month_trackers: Option<i64>,
    pub new_trackers_added: Option<i64>,
    pub privacy_decay_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub by_company: Vec<CompanyHits>,
    pub by_category: Vec<CategoryHits>,
    pub week_over_week_change: Vec<WeekOverWeek>,
    pub monthly_privacy_stats: Vec<MonthlyPrivacy>,
}

// ============ 纯计算部分 ============

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// 按公司分组，保持查询返回的顺序
pub fn group_by_company(rows: Vec<crate::storage::CompanyDomainRow>) -> Vec<CompanyGroup> {
    let mut groups: Vec<CompanyGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.company.clone()).or_insert_with(|| {
            groups.push(CompanyGroup {
                company: row.company.clone(),
                domains: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].domains.push(GroupedDomain {
            domain: row.domain,
            category: row.category,
            total_hits: row.total_hits,
            entry_count: row.entry_count,
        });
    }
    groups
}

/// 合并两个 7 天窗口并计算变化率（上周无命中的公司不计入）
pub fn week_over_week(last_week: Vec<CompanyHits>, week_before: Vec<CompanyHits>) -> Vec<WeekOverWeek> {
    let before: HashMap<String, i64> = week_before
        .into_iter()
        .map(|c| (c.company, c.total_occurrences))
        .collect();

    let mut merged: Vec<CompanyWeekHits> = last_week
        .into_iter()
        .filter(|c| c.total_occurrences > 0)
        .map(|c| CompanyWeekHits {
            week_before: before.get(&c.company).copied().unwrap_or(0),
            last_week: c.total_occurrences,
            company: c.company,
        })
        .collect();
    merged.sort_by(|a, b| a.company.cmp(&b.company));

    let mut changes: Vec<WeekOverWeek> = merged
        .into_iter()
        .map(|c| WeekOverWeek {
            percent_change: if c.week_before == 0 {
                NEW_COMPANY_CHANGE
            } else {
                round1((c.last_week - c.week_before) as f64 * 100.0 / c.week_before as f64)
            },
            company: c.company,
            last_week: c.last_week,
            week_before: c.week_before,
        })
        .collect();

    changes.sort_by(|a, b| b.percent_change.total_cmp(&a.percent_change));
    changes.truncate(INSIGHT_TOP_N);
    changes
}

/// 月度统计：`rows` 按月份降序，多取一个月用于计算最早一个月的环比
pub fn monthly_privacy(rows: &[MonthlyTrackerRow]) -> Vec<MonthlyPrivacy> {
    rows.iter()
        .enumerate()
        .take(INSIGHT_MONTHS)
        .map(|(i, row)| {
            let prev = rows.get(i + 1).map(|p| p.unique_trackers);
            MonthlyPrivacy {
                month: row.month.clone(),
                unique_trackers: row.unique_trackers,
                total_tracking: row.total_tracking,
                prev_month_trackers: prev,
                new_trackers_added: prev.map(|p| row.unique_trackers - p),
                privacy_decay_percent: prev.map(|p| {
                    if p == 0 {
                        0.0
                    } else {
                        round1(row.unique_trackers as f64 * 100.0 / p as f64 - 100.0)
                    }
                }),
            }
        })
        .collect()
}

// ============ DashboardService ============

pub struct DashboardService {
    warehouse: Option<Arc<Warehouse>>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(warehouse: Option<Arc<Warehouse>>, config: DashboardConfig) -> Self {
        Self { warehouse, config }
    }

    fn warehouse(&self) -> Result<&Warehouse> {
        self.warehouse
            .as_deref()
            .ok_or_else(|| PrivacyShieldError::warehouse_unavailable("Database not available"))
    }

    /// email 为空时只有在显式允许下才按全部用户查询
    pub fn resolve_scope(&self, email: Option<&str>) -> Result<UserScope> {
        match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Ok(UserScope::User(email.to_string())),
            None if self.config.allow_unscoped_queries => Ok(UserScope::AllUsers),
            None => Err(PrivacyShieldError::validation("email is required")),
        }
    }

    /// 列表条数：默认值 + 上限
    pub fn history_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.config.default_history_limit)
            .clamp(1, self.config.max_history_limit.max(1))
    }

    /// 趋势天数钳制到 `[1, max_trend_days]`
    pub fn trend_days(&self, requested: Option<i64>) -> u32 {
        let max = i64::from(self.config.max_trend_days.max(1));
        requested.unwrap_or(DEFAULT_TREND_DAYS).clamp(1, max) as u32
    }

    pub async fn overview(&self, scope: &UserScope) -> Result<Overview> {
        let warehouse = self.warehouse()?;
        info!("Dashboard: overview for {}", scope.label());

        let today = utc_today();
        let since = window_start(today, OVERVIEW_DAYS).and_time(NaiveTime::MIN).and_utc();

        let totals = warehouse.tracker_totals(scope, None).await?;
        let total_cookies = warehouse.count_cookies(scope).await?;
        let daily = warehouse.tracker_daily(scope, since).await?;
        let categories = warehouse.category_counts(scope).await?;

        let time_series = pad_daily(
            &daily,
            today,
            OVERVIEW_DAYS,
            OVERVIEW_PLACEHOLDER,
            &mut rand::rng(),
        )
        .into_iter()
        .map(|p| OverviewPoint {
            date: p.date,
            value: p.count,
            is_real: p.is_real,
        })
        .collect();

        Ok(Overview {
            total_events: totals.total_trackers + total_cookies,
            unique_sites: totals.unique_sites,
            total_trackers: totals.total_trackers,
            total_cookies,
            time_series,
            categories,
        })
    }

    pub async fn trends(&self, scope: &UserScope, days: Option<i64>) -> Result<Trends> {
        let warehouse = self.warehouse()?;
        let days = self.trend_days(days);
        info!("Dashboard: trends for {} over {} days", scope.label(), days);

        let today = utc_today();
        let since = window_start(today, days).and_time(NaiveTime::MIN).and_utc();

        let tracker_rows = warehouse.tracker_daily(scope, since).await?;
        let cookie_rows = warehouse.cookie_daily(scope, since).await?;

        let mut rng = rand::rng();
        let tracker_daily = pad_daily(&tracker_rows, today, days, TRACKER_TREND_PLACEHOLDER, &mut rng)
            .into_iter()
            .map(TrendPoint::from)
            .collect();
        let cookie_daily = pad_daily(&cookie_rows, today, days, COOKIE_TREND_PLACEHOLDER, &mut rng)
            .into_iter()
            .map(TrendPoint::from)
            .collect();

        Ok(Trends {
            tracker_daily,
            cookie_daily,
        })
    }

    pub async fn breakdown(&self, scope: &UserScope) -> Result<Breakdown> {
        let warehouse = self.warehouse()?;
        info!("Dashboard: breakdown for {}", scope.label());

        let totals = warehouse.tracker_totals(scope, None).await?;
        let top_by_initiator = warehouse.top_initiators(scope, TOP_N).await?;
        let top_by_domain = warehouse.top_domains(scope, TOP_N).await?;
        let company_groups = group_by_company(warehouse.company_domain_rows(scope).await?);
        let all_trackers = warehouse
            .get_trackers(scope, self.config.default_history_limit)
            .await?;

        debug!(
            "Dashboard: breakdown has {} company groups, {} trackers",
            company_groups.len(),
            all_trackers.len()
        );

        Ok(Breakdown {
            total_trackers: totals.total_trackers,
            top_by_initiator,
            top_by_domain,
            company_groups,
            all_trackers,
        })
    }

    pub async fn cookies(&self, scope: &UserScope, limit: Option<u64>) -> Result<CookiesPage> {
        let warehouse = self.warehouse()?;
        let limit = self.history_limit(limit);
        info!("Dashboard: cookies for {} (limit {})", scope.label(), limit);

        Ok(CookiesPage {
            cookies: warehouse.get_cookies(scope, limit).await?,
            stats: warehouse.get_cookie_stats(scope).await?,
        })
    }

    pub async fn tracker_history(
        &self,
        scope: &UserScope,
        limit: Option<u64>,
    ) -> Result<TrackerHistory> {
        let warehouse = self.warehouse()?;
        let limit = self.history_limit(limit);
        info!("Dashboard: tracker history for {} (limit {})", scope.label(), limit);

        Ok(TrackerHistory {
            trackers: warehouse.get_trackers(scope, limit).await?,
            stats: warehouse.get_tracker_stats(scope).await?,
        })
    }

    pub async fn insights(&self, scope: &UserScope) -> Result<Insights> {
        let warehouse = self.warehouse()?;
        info!("Dashboard: insights for {}", scope.label());

        let now = Utc::now();
        let week_ago = now - Duration::days(7);
        let two_weeks_ago = now - Duration::days(14);

        let by_company = warehouse
            .company_hits_between(scope, week_ago, None, Some(INSIGHT_TOP_N as u64))
            .await?;
        let by_category = warehouse.top_categories(scope, INSIGHT_TOP_N as u64).await?;
        let last_week = warehouse
            .company_hits_between(scope, week_ago, None, None)
            .await?;
        let week_before = warehouse
            .company_hits_between(scope, two_weeks_ago, Some(week_ago), None)
            .await?;
        let months = warehouse
            .monthly_tracker_stats(scope, INSIGHT_MONTHS as u64 + 1)
            .await?;

        Ok(Insights {
            by_company,
            by_category,
            week_over_week_change: week_over_week(last_week, week_before),
            monthly_privacy_stats: monthly_privacy(&months),
        })
    }

    /// 摘要 prompt 所需的统计
    pub async fn summary_input(&self, scope: &UserScope) -> Result<SummaryInput> {
        let warehouse = self.warehouse()?;
        let totals = warehouse.tracker_totals(scope, None).await?;
        let total_cookies = warehouse.count_cookies(scope).await?;
        let categories = warehouse.category_counts(scope).await?;
        let top_companies = warehouse
            .company_hits_between(
                scope,
                chrono::DateTime::UNIX_EPOCH,
                None,
                Some(INSIGHT_TOP_N as u64),
            )
            .await?;

        Ok(SummaryInput {
            total_trackers: totals.total_trackers,
            total_cookies,
            unique_sites: totals.unique_sites,
            categories: categories.into_iter().map(|c| (c.category, c.count)).collect(),
            top_companies: top_companies
                .into_iter()
                .map(|c| (c.company, c.total_occurrences))
                .collect(),
        })
    }
}
