//! Wire-level records accepted from the extension and view rows read back out

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 查询作用域：单个用户，或显式选择的全部用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserScope {
    User(String),
    AllUsers,
}

impl UserScope {
    /// 用户过滤值；`AllUsers` 时不追加谓词
    pub fn email(&self) -> Option<&str> {
        match self {
            UserScope::User(email) => Some(email.as_str()),
            UserScope::AllUsers => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            UserScope::User(email) => email,
            UserScope::AllUsers => "<all users>",
        }
    }
}

/// 扩展上传的单条 tracker 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerUpload {
    pub domain: String,
    pub full_url: String,
    #[serde(rename = "type")]
    pub request_type: String,
    pub initiator: String,
    pub is_third_party: bool,
    pub is_known_tracker: bool,
    pub is_blocked: bool,
    pub company: Option<String>,
    pub category: Option<String>,
    pub source: String,
    pub occurrences: i64,
    /// 首次出现时间 (RFC 3339)
    pub timestamp: Option<String>,
    pub last_seen: Option<String>,
}

impl Default for TrackerUpload {
    fn default() -> Self {
        Self {
            domain: String::new(),
            full_url: String::new(),
            request_type: String::new(),
            initiator: String::new(),
            is_third_party: false,
            is_known_tracker: false,
            is_blocked: false,
            company: None,
            category: None,
            source: String::new(),
            occurrences: 1,
            timestamp: None,
            last_seen: None,
        }
    }
}

/// 扩展上传的单条 cookie 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieUpload {
    pub name: String,
    pub domain: String,
    pub path: String,
    pub set_by: String,
    pub initiator: String,
    pub is_third_party: bool,
    pub is_tracker: bool,
    pub persistent: bool,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
    /// 过期时间，Unix 秒（浏览器 cookies API 的格式）
    pub expiration_date: Option<f64>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub classification: String,
    pub page_url: String,
}

impl Default for CookieUpload {
    fn default() -> Self {
        Self {
            name: String::new(),
            domain: String::new(),
            path: "/".to_string(),
            set_by: String::new(),
            initiator: String::new(),
            is_third_party: false,
            is_tracker: false,
            persistent: false,
            secure: false,
            http_only: false,
            same_site: "None".to_string(),
            expiration_date: None,
            company: None,
            category: None,
            classification: String::new(),
            page_url: String::new(),
        }
    }
}

/// 等待富化回填的 tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnenrichedTracker {
    pub id: i64,
    pub domain: String,
    pub company: Option<String>,
}

/// 按天统计的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    /// YYYY-MM-DD
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitiatorCount {
    pub initiator: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub company: String,
    pub count: i64,
}

/// 公司 × 域名 聚合行（breakdown 页面分组前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDomainRow {
    pub company: String,
    pub domain: String,
    pub category: String,
    pub total_hits: i64,
    pub entry_count: i64,
}

/// 仪表盘列表里的 tracker 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerView {
    pub id: String,
    pub domain: String,
    pub full_url: String,
    pub request_type: String,
    pub initiator: String,
    pub company: String,
    pub category: String,
    pub is_third_party: bool,
    pub is_known_tracker: bool,
    pub is_blocked: bool,
    pub occurrences: i64,
    pub device_id: String,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: String,
}

/// 仪表盘列表里的 cookie 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieView {
    pub id: String,
    pub cookie_name: String,
    pub domain: String,
    pub company: String,
    pub category: String,
    pub is_tracker: bool,
    pub is_third_party: bool,
    pub is_persistent: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    pub page_url: String,
    pub detected_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieStats {
    pub total_cookies: i64,
    pub third_party_count: i64,
    pub tracker_count: i64,
    pub persistent_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStat {
    pub company: String,
    pub category: String,
    pub count: i64,
    pub total_hits: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerTotals {
    pub total_trackers: i64,
    pub unique_sites: i64,
}

/// 安全报告的单域名统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRisk {
    pub domain: String,
    pub company: String,
    pub category: String,
    pub total_hits: i64,
    pub unique_initiators: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityReportData {
    pub total_trackers: i64,
    pub unique_sites: i64,
    pub domain_stats: Vec<DomainRisk>,
}

/// 公司在两个连续 7 天窗口内的命中数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyWeekHits {
    pub company: String,
    pub last_week: i64,
    pub week_before: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyHits {
    pub company: String,
    pub total_occurrences: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHits {
    pub category: String,
    pub total_occurrences: i64,
    pub unique_companies: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTrackerRow {
    /// YYYY-MM
    pub month: String,
    pub unique_trackers: i64,
    pub total_tracking: i64,
}
