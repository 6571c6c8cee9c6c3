use chrono::{DateTime, TimeZone, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::{CookieUpload, CookieView, TrackerUpload, TrackerView};
use migration::entities::{cookie_event, tracker_event};

/// 按字符截断到列宽（不会切开多字节字符）
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

fn truncate_opt(value: Option<&str>, max_chars: usize) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| truncate_chars(v, max_chars))
}

/// 解析扩展上报的 RFC 3339 时间；格式不对就当作缺失
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn epoch_seconds(raw: Option<f64>) -> Option<DateTime<Utc>> {
    let secs = raw.filter(|v| v.is_finite() && *v > 0.0)?;
    Utc.timestamp_opt(secs.trunc() as i64, 0).single()
}

pub fn tracker_to_active_model(
    tracker: &TrackerUpload,
    user_email: &str,
    device_id: &str,
    detected_at: DateTime<Utc>,
) -> tracker_event::ActiveModel {
    tracker_event::ActiveModel {
        id: NotSet,
        domain: Set(truncate_chars(&tracker.domain, 255)),
        full_url: Set(truncate_chars(&tracker.full_url, 2000)),
        request_type: Set(truncate_chars(&tracker.request_type, 50)),
        initiator: Set(truncate_chars(&tracker.initiator, 500)),
        is_third_party: Set(tracker.is_third_party),
        is_known_tracker: Set(tracker.is_known_tracker),
        is_blocked: Set(tracker.is_blocked),
        company: Set(truncate_opt(tracker.company.as_deref(), 255)),
        category: Set(truncate_opt(tracker.category.as_deref(), 100)),
        detection_source: Set(truncate_chars(&tracker.source, 50)),
        occurrences: Set(tracker.occurrences.max(1)),
        user_email: Set(truncate_chars(user_email, 255)),
        device_id: Set(truncate_chars(device_id, 100)),
        first_seen: Set(parse_timestamp(tracker.timestamp.as_deref())),
        last_seen: Set(parse_timestamp(tracker.last_seen.as_deref())),
        detected_at: Set(detected_at),
    }
}

pub fn cookie_to_active_model(
    cookie: &CookieUpload,
    user_email: &str,
    device_id: &str,
    detected_at: DateTime<Utc>,
) -> cookie_event::ActiveModel {
    cookie_event::ActiveModel {
        id: NotSet,
        cookie_name: Set(truncate_chars(&cookie.name, 255)),
        domain: Set(truncate_chars(&cookie.domain, 255)),
        path: Set(truncate_chars(&cookie.path, 500)),
        set_by: Set(truncate_chars(&cookie.set_by, 255)),
        initiator: Set(truncate_chars(&cookie.initiator, 500)),
        is_third_party: Set(cookie.is_third_party),
        is_tracker: Set(cookie.is_tracker),
        is_persistent: Set(cookie.persistent),
        secure: Set(cookie.secure),
        http_only: Set(cookie.http_only),
        same_site: Set(truncate_chars(&cookie.same_site, 20)),
        expiration_date: Set(epoch_seconds(cookie.expiration_date)),
        company: Set(truncate_opt(cookie.company.as_deref(), 255)),
        category: Set(truncate_opt(cookie.category.as_deref(), 100)),
        classification: Set(truncate_chars(&cookie.classification, 50)),
        user_email: Set(truncate_chars(user_email, 255)),
        device_id: Set(truncate_chars(device_id, 100)),
        page_url: Set(truncate_chars(&cookie.page_url, 1000)),
        detected_at: Set(detected_at),
    }
}

/// 空公司名显示为 "Unknown"
pub(super) fn company_label(company: Option<String>) -> String {
    company
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// 空分类显示为 "unknown"
pub(super) fn category_label(category: Option<String>) -> String {
    category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn model_to_tracker_view(model: tracker_event::Model) -> TrackerView {
    TrackerView {
        id: model.id.to_string(),
        domain: model.domain,
        full_url: model.full_url,
        request_type: model.request_type,
        initiator: model.initiator,
        company: company_label(model.company),
        category: category_label(model.category),
        is_third_party: model.is_third_party,
        is_known_tracker: model.is_known_tracker,
        is_blocked: model.is_blocked,
        occurrences: model.occurrences.max(1),
        device_id: model.device_id,
        first_seen: model.first_seen,
        last_seen: model.last_seen,
        created_at: model.detected_at.to_rfc3339(),
    }
}

pub fn model_to_cookie_view(model: cookie_event::Model) -> CookieView {
    CookieView {
        id: model.id.to_string(),
        cookie_name: model.cookie_name,
        domain: model.domain,
        company: company_label(model.company),
        category: category_label(model.category),
        is_tracker: model.is_tracker,
        is_third_party: model.is_third_party,
        is_persistent: model.is_persistent,
        expiration_date: model.expiration_date,
        page_url: model.page_url,
        detected_at: model.detected_at.to_rfc3339(),
    }
}
