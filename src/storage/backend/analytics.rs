//! Dashboard aggregation queries
//!
//! Every aggregate is computed on read. Labels for missing company/category are
//! folded in SQL so NULL and '' land in the same bucket.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait, Select,
};

use super::Warehouse;
use super::retry;
use crate::errors::Result;
use crate::storage::{
    CategoryCount, CategoryHits, CompanyDomainRow, CompanyHits, CompanyStat, CookieStats,
    DailyCount, DomainCount, DomainRisk, InitiatorCount, MonthlyTrackerRow, SecurityReportData,
    TrackerTotals, UserScope,
};

use migration::entities::{cookie_event, tracker_event};

const COMPANY_LABEL: &str = "COALESCE(NULLIF(company, ''), 'Unknown')";
/// 按域名聚合时取一个标签：有真实标签的优先
const DOMAIN_COMPANY_LABEL: &str = "COALESCE(MAX(NULLIF(company, '')), 'Unknown')";
const CATEGORY_LABEL: &str = "COALESCE(NULLIF(category, ''), 'unknown')";

// ============ 查询结果类型 ============

#[derive(Debug, FromQueryResult)]
struct LabelCountRow {
    label: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_trackers: i64,
    unique_sites: i64,
}

#[derive(Debug, FromQueryResult)]
struct DomainCountRow {
    domain: String,
    company: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct CompanyDomainQueryRow {
    company: String,
    domain: String,
    category: String,
    total_hits: i64,
    entry_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct CompanyStatRow {
    company: String,
    category: String,
    count: i64,
    total_hits: i64,
}

#[derive(Debug, FromQueryResult)]
struct CookieStatsRow {
    total_cookies: i64,
    third_party_count: i64,
    tracker_count: i64,
    persistent_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct DomainRiskRow {
    domain: String,
    company: String,
    category: String,
    total_hits: i64,
    unique_initiators: i64,
}

#[derive(Debug, FromQueryResult)]
struct CompanyHitsRow {
    company: String,
    total_occurrences: i64,
}

#[derive(Debug, FromQueryResult)]
struct CategoryHitsRow {
    category: String,
    total_occurrences: i64,
    unique_companies: i64,
}

#[derive(Debug, FromQueryResult)]
struct MonthRow {
    month: String,
    unique_trackers: i64,
    total_tracking: i64,
}

// ============ 方言相关表达式 ============

impl Warehouse {
    /// 按天（YYYY-MM-DD）格式化时间列
    fn day_expr(&self, column: &str) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust(format!("strftime('%Y-%m-%d', {})", column)),
            DbBackend::MySql => Expr::cust(format!("DATE_FORMAT({}, '%Y-%m-%d')", column)),
            DbBackend::Postgres | _ => Expr::cust(format!("TO_CHAR({}, 'YYYY-MM-DD')", column)),
        }
    }

    /// 按月（YYYY-MM）格式化时间列
    fn month_expr(&self, column: &str) -> Expr {
        match self.db_backend() {
            DbBackend::Sqlite => Expr::cust(format!("strftime('%Y-%m', {})", column)),
            DbBackend::MySql => Expr::cust(format!("DATE_FORMAT({}, '%Y-%m')", column)),
            DbBackend::Postgres | _ => Expr::cust(format!("TO_CHAR({}, 'YYYY-MM')", column)),
        }
    }

    /// SUM 在 MySQL 是 DECIMAL、在 PostgreSQL 是 NUMERIC，统一转成 64 位整数
    fn sum_expr(&self, inner: &str) -> Expr {
        let int_type = match self.db_backend() {
            DbBackend::MySql => "SIGNED",
            _ => "BIGINT",
        };
        Expr::cust(format!("COALESCE(CAST(SUM({}) AS {}), 0)", inner, int_type))
    }

    fn count_when(&self, flag: &str) -> Expr {
        self.sum_expr(&format!("CASE WHEN {} THEN 1 ELSE 0 END", flag))
    }
}

fn scoped_trackers(scope: &UserScope) -> Select<tracker_event::Entity> {
    tracker_event::Entity::find().apply_if(scope.email(), |q, email| {
        q.filter(tracker_event::Column::UserEmail.eq(email))
    })
}

fn scoped_cookies(scope: &UserScope) -> Select<cookie_event::Entity> {
    cookie_event::Entity::find().apply_if(scope.email(), |q, email| {
        q.filter(cookie_event::Column::UserEmail.eq(email))
    })
}

// ============ Warehouse 聚合查询 ============

impl Warehouse {
    /// tracker 总数与发起站点数；`since` 为空时统计全部
    pub async fn tracker_totals(
        &self,
        scope: &UserScope,
        since: Option<DateTime<Utc>>,
    ) -> Result<TrackerTotals> {
        let db = &self.db;
        let row = retry::with_retry("tracker_totals", self.retry_config, || async {
            scoped_trackers(scope)
                .apply_if(since, |q, since| {
                    q.filter(tracker_event::Column::DetectedAt.gte(since))
                })
                .select_only()
                .column_as(tracker_event::Column::Id.count(), "total_trackers")
                .column_as(Expr::cust("COUNT(DISTINCT initiator)"), "unique_sites")
                .into_model::<TotalsRow>()
                .one(db)
                .await
        })
        .await?;

        Ok(row
            .map(|r| TrackerTotals {
                total_trackers: r.total_trackers,
                unique_sites: r.unique_sites,
            })
            .unwrap_or_default())
    }

    pub async fn count_cookies(&self, scope: &UserScope) -> Result<i64> {
        use sea_orm::PaginatorTrait;
        let db = &self.db;
        let count = retry::with_retry("count_cookies", self.retry_config, || async {
            scoped_cookies(scope).count(db).await
        })
        .await?;
        Ok(count as i64)
    }

    /// 每天的 tracker 事件数（`since` 起，按日期升序）
    pub async fn tracker_daily(
        &self,
        scope: &UserScope,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>> {
        let db = &self.db;
        let day = self.day_expr("detected_at");
        let rows = retry::with_retry("tracker_daily", self.retry_config, || async {
            scoped_trackers(scope)
                .filter(tracker_event::Column::DetectedAt.gte(since))
                .select_only()
                .column_as(day.clone(), "label")
                .column_as(tracker_event::Column::Id.count(), "count")
                .group_by(day.clone())
                .order_by_asc(Expr::cust("label"))
                .into_model::<LabelCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyCount {
                date: r.label,
                count: r.count,
            })
            .collect())
    }

    /// 每天的 cookie 事件数
    pub async fn cookie_daily(
        &self,
        scope: &UserScope,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>> {
        let db = &self.db;
        let day = self.day_expr("detected_at");
        let rows = retry::with_retry("cookie_daily", self.retry_config, || async {
            scoped_cookies(scope)
                .filter(cookie_event::Column::DetectedAt.gte(since))
                .select_only()
                .column_as(day.clone(), "label")
                .column_as(cookie_event::Column::Id.count(), "count")
                .group_by(day.clone())
                .order_by_asc(Expr::cust("label"))
                .into_model::<LabelCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyCount {
                date: r.label,
                count: r.count,
            })
            .collect())
    }

    /// 分类排行
    pub async fn category_counts(&self, scope: &UserScope) -> Result<Vec<CategoryCount>> {
        let db = &self.db;
        let rows = retry::with_retry("category_counts", self.retry_config, || async {
            scoped_trackers(scope)
                .select_only()
                .column_as(Expr::cust(CATEGORY_LABEL), "label")
                .column_as(tracker_event::Column::Id.count(), "count")
                .group_by(Expr::cust(CATEGORY_LABEL))
                .order_by_desc(Expr::cust("count"))
                .into_model::<LabelCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryCount {
                category: r.label,
                count: r.count,
            })
            .collect())
    }

    /// 发起请求最多的站点
    pub async fn top_initiators(&self, scope: &UserScope, limit: u64) -> Result<Vec<InitiatorCount>> {
        let db = &self.db;
        let rows = retry::with_retry("top_initiators", self.retry_config, || async {
            scoped_trackers(scope)
                .filter(tracker_event::Column::Initiator.ne(""))
                .select_only()
                .column_as(tracker_event::Column::Initiator, "label")
                .column_as(tracker_event::Column::Id.count(), "count")
                .group_by(tracker_event::Column::Initiator)
                .order_by_desc(Expr::cust("count"))
                .limit(limit)
                .into_model::<LabelCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| InitiatorCount {
                initiator: r.label,
                count: r.count,
            })
            .collect())
    }

    /// 出现最多的 tracker 域名，每个域名一行
    pub async fn top_domains(&self, scope: &UserScope, limit: u64) -> Result<Vec<DomainCount>> {
        let db = &self.db;
        let rows = retry::with_retry("top_domains", self.retry_config, || async {
            scoped_trackers(scope)
                .select_only()
                .column(tracker_event::Column::Domain)
                .column_as(Expr::cust(DOMAIN_COMPANY_LABEL), "company")
                .column_as(tracker_event::Column::Id.count(), "count")
                .group_by(tracker_event::Column::Domain)
                .order_by_desc(Expr::cust("count"))
                .limit(limit)
                .into_model::<DomainCountRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DomainCount {
                domain: r.domain,
                company: r.company,
                count: r.count,
            })
            .collect())
    }

    /// 公司 × 域名 × 分类 的命中统计，公司按字母序
    pub async fn company_domain_rows(&self, scope: &UserScope) -> Result<Vec<CompanyDomainRow>> {
        let db = &self.db;
        let hits = self.sum_expr("occurrences");
        let rows = retry::with_retry("company_domain_rows", self.retry_config, || async {
            scoped_trackers(scope)
                .select_only()
                .column_as(Expr::cust(COMPANY_LABEL), "company")
                .column(tracker_event::Column::Domain)
                .column_as(Expr::cust(CATEGORY_LABEL), "category")
                .column_as(hits.clone(), "total_hits")
                .column_as(tracker_event::Column::Id.count(), "entry_count")
                .group_by(Expr::cust(COMPANY_LABEL))
                .group_by(tracker_event::Column::Domain)
                .group_by(Expr::cust(CATEGORY_LABEL))
                .order_by_asc(Expr::cust("company"))
                .order_by_desc(Expr::cust("total_hits"))
                .into_model::<CompanyDomainQueryRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CompanyDomainRow {
                company: r.company,
                domain: r.domain,
                category: r.category,
                total_hits: r.total_hits,
                entry_count: r.entry_count,
            })
            .collect())
    }

    /// 按公司/分类汇总（tracker 历史页）
    pub async fn get_tracker_stats(&self, scope: &UserScope) -> Result<Vec<CompanyStat>> {
        let db = &self.db;
        let hits = self.sum_expr("occurrences");
        let rows = retry::with_retry("get_tracker_stats", self.retry_config, || async {
            scoped_trackers(scope)
                .select_only()
                .column_as(Expr::cust(COMPANY_LABEL), "company")
                .column_as(Expr::cust(CATEGORY_LABEL), "category")
                .column_as(tracker_event::Column::Id.count(), "count")
                .column_as(hits.clone(), "total_hits")
                .group_by(Expr::cust(COMPANY_LABEL))
                .group_by(Expr::cust(CATEGORY_LABEL))
                .order_by_desc(Expr::cust("total_hits"))
                .into_model::<CompanyStatRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CompanyStat {
                company: r.company,
                category: r.category,
                count: r.count,
                total_hits: r.total_hits,
            })
            .collect())
    }

    pub async fn get_cookie_stats(&self, scope: &UserScope) -> Result<CookieStats> {
        let db = &self.db;
        let third_party = self.count_when("is_third_party");
        let tracker = self.count_when("is_tracker");
        let persistent = self.count_when("is_persistent");
        let row = retry::with_retry("get_cookie_stats", self.retry_config, || async {
            scoped_cookies(scope)
                .select_only()
                .column_as(cookie_event::Column::Id.count(), "total_cookies")
                .column_as(third_party.clone(), "third_party_count")
                .column_as(tracker.clone(), "tracker_count")
                .column_as(persistent.clone(), "persistent_count")
                .into_model::<CookieStatsRow>()
                .one(db)
                .await
        })
        .await?;

        Ok(row
            .map(|r| CookieStats {
                total_cookies: r.total_cookies,
                third_party_count: r.third_party_count,
                tracker_count: r.tracker_count,
                persistent_count: r.persistent_count,
            })
            .unwrap_or_default())
    }

    /// 安全报告所需的域名级统计（按命中数降序）
    pub async fn security_report_data(
        &self,
        scope: &UserScope,
        since: DateTime<Utc>,
        max_domains: u64,
    ) -> Result<SecurityReportData> {
        let totals = self.tracker_totals(scope, Some(since)).await?;

        let db = &self.db;
        let hits = self.sum_expr("occurrences");
        let rows = retry::with_retry("security_report_data", self.retry_config, || async {
            scoped_trackers(scope)
                .filter(tracker_event::Column::DetectedAt.gte(since))
                .select_only()
                .column(tracker_event::Column::Domain)
                .column_as(Expr::cust(COMPANY_LABEL), "company")
                .column_as(Expr::cust(CATEGORY_LABEL), "category")
                .column_as(hits.clone(), "total_hits")
                .column_as(Expr::cust("COUNT(DISTINCT initiator)"), "unique_initiators")
                .group_by(tracker_event::Column::Domain)
                .group_by(Expr::cust(COMPANY_LABEL))
                .group_by(Expr::cust(CATEGORY_LABEL))
                .order_by_desc(Expr::cust("total_hits"))
                .limit(max_domains)
                .into_model::<DomainRiskRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(SecurityReportData {
            total_trackers: totals.total_trackers,
            unique_sites: totals.unique_sites,
            domain_stats: rows
                .into_iter()
                .map(|r| DomainRisk {
                    domain: r.domain,
                    company: r.company,
                    category: r.category,
                    total_hits: r.total_hits,
                    unique_initiators: r.unique_initiators,
                })
                .collect(),
        })
    }

    /// `[start, end)` 区间内各公司的命中数（降序）
    pub async fn company_hits_between(
        &self,
        scope: &UserScope,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        limit: Option<u64>,
    ) -> Result<Vec<CompanyHits>> {
        let db = &self.db;
        let hits = self.sum_expr("occurrences");
        let rows = retry::with_retry("company_hits_between", self.retry_config, || async {
            scoped_trackers(scope)
                .filter(tracker_event::Column::DetectedAt.gte(start))
                .apply_if(end, |q, end| q.filter(tracker_event::Column::DetectedAt.lt(end)))
                .select_only()
                .column_as(Expr::cust(COMPANY_LABEL), "company")
                .column_as(hits.clone(), "total_occurrences")
                .group_by(Expr::cust(COMPANY_LABEL))
                .order_by_desc(Expr::cust("total_occurrences"))
                .apply_if(limit, |q, limit| q.limit(limit))
                .into_model::<CompanyHitsRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CompanyHits {
                company: r.company,
                total_occurrences: r.total_occurrences,
            })
            .collect())
    }

    /// 分类排行（含每类涉及的公司数）
    pub async fn top_categories(&self, scope: &UserScope, limit: u64) -> Result<Vec<CategoryHits>> {
        let db = &self.db;
        let hits = self.sum_expr("occurrences");
        let rows = retry::with_retry("top_categories", self.retry_config, || async {
            scoped_trackers(scope)
                .select_only()
                .column_as(Expr::cust(CATEGORY_LABEL), "category")
                .column_as(hits.clone(), "total_occurrences")
                .column_as(Expr::cust("COUNT(DISTINCT company)"), "unique_companies")
                .group_by(Expr::cust(CATEGORY_LABEL))
                .order_by_desc(Expr::cust("total_occurrences"))
                .limit(limit)
                .into_model::<CategoryHitsRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryHits {
                category: r.category,
                total_occurrences: r.total_occurrences,
                unique_companies: r.unique_companies,
            })
            .collect())
    }

    /// 最近 `months` 个月的月度统计（按月份降序）
    pub async fn monthly_tracker_stats(
        &self,
        scope: &UserScope,
        months: u64,
    ) -> Result<Vec<MonthlyTrackerRow>> {
        let db = &self.db;
        let month = self.month_expr("detected_at");
        let hits = self.sum_expr("occurrences");
        let rows = retry::with_retry("monthly_tracker_stats", self.retry_config, || async {
            scoped_trackers(scope)
                .select_only()
                .column_as(month.clone(), "month")
                .column_as(Expr::cust("COUNT(DISTINCT company)"), "unique_trackers")
                .column_as(hits.clone(), "total_tracking")
                .group_by(month.clone())
                .order_by_desc(Expr::cust("month"))
                .limit(months)
                .into_model::<MonthRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| MonthlyTrackerRow {
                month: r.month,
                unique_trackers: r.unique_trackers,
                total_tracking: r.total_tracking,
            })
            .collect())
    }
}
