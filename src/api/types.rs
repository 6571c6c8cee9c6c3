//! HTTP 请求/响应类型

use serde::{Deserialize, Serialize};

use crate::storage::{CookieUpload, TrackerUpload};

/// 错误响应体
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

// ============ 扩展端写入 ============

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub email: String,
    pub device_id: String,
    #[serde(default)]
    pub trackers: Vec<TrackerUpload>,
    #[serde(default)]
    pub cookies: Vec<CookieUpload>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cookies_inserted: u64,
    pub trackers_inserted: u64,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CookieUploadRequest {
    pub email: String,
    pub device_id: String,
    #[serde(default)]
    pub cookies: Vec<CookieUpload>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct CookieUploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cookies_inserted: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BlocklistAddRequest {
    pub domain: String,
    pub email: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BlocklistRemoveRequest {
    pub domain: String,
    pub email: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct BlocklistResponse {
    pub domains: Vec<String>,
}

// ============ 查询参数 ============

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistQuery {
    pub email: Option<String>,
    /// 扩展会带上，目前不参与过滤
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LimitQuery {
    pub email: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct TrendsQuery {
    pub email: Option<String>,
    pub days: Option<i64>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ReportQuery {
    pub email: Option<String>,
    pub start_date: Option<String>,
}

// ============ 识别 ============

#[derive(Deserialize, Clone, Debug)]
pub struct DomainRequest {
    pub domain: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BatchDomainRequest {
    pub domains: Vec<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SummaryResponse {
    pub summary: String,
}

// ============ 健康检查 ============

#[derive(Serialize, Clone, Debug)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub enrichment: &'static str,
    pub ai: &'static str,
}
