//! Sparse time-series padding for dashboard charts
//!
//! Days with no real rows get a random placeholder flagged `is_real = false`.
//! The placeholders are a display convenience, not an estimate.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;

use crate::storage::DailyCount;

/// 概览页每日事件占位范围
pub const OVERVIEW_PLACEHOLDER: RangeInclusive<i64> = 80..=250;
/// 趋势页 tracker 占位范围
pub const TRACKER_TREND_PLACEHOLDER: RangeInclusive<i64> = 30..=90;
/// 趋势页 cookie 占位范围
pub const COOKIE_TREND_PLACEHOLDER: RangeInclusive<i64> = 10..=50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedPoint {
    pub date: String,
    pub count: i64,
    pub is_real: bool,
}

/// 窗口的最后一天
///
/// 事件时间按 UTC 入库，按天分桶也取 UTC 日期，窗口必须和分桶用同一个日历。
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// 窗口第一天（含）
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today - Duration::days(i64::from(window_days.max(1)) - 1)
}

/// 生成 `[today - window + 1, today]` 的连续日期序列，按日期升序
pub fn pad_daily<R: Rng>(
    real: &[DailyCount],
    today: NaiveDate,
    window_days: u32,
    placeholder: RangeInclusive<i64>,
    rng: &mut R,
) -> Vec<PaddedPoint> {
    let by_date: HashMap<&str, i64> = real.iter().map(|r| (r.date.as_str(), r.count)).collect();
    let start = window_start(today, window_days);

    start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| {
            let date = day.format("%Y-%m-%d").to_string();
            match by_date.get(date.as_str()) {
                Some(count) => PaddedPoint {
                    date,
                    count: *count,
                    is_real: true,
                },
                None => PaddedPoint {
                    date,
                    count: rng.random_range(placeholder.clone()),
                    is_real: false,
                },
            }
        })
        .collect()
}
