//! Tracker enrichment
//!
//! Fills in missing company/category labels from the public entity ownership
//! map. The matcher is built once at startup and shared read-only.

pub mod loader;
pub mod matcher;

use std::fmt;

pub use loader::load_matcher;
pub use matcher::{
    BatchIdentification, CompanyMatch, EnrichmentRecord, MatcherStats, TrackerInfo,
    TrackerMatcher, UNKNOWN, category_for_company, clean_domain,
};

/// 富化子系统对外报告的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentState {
    /// 配置关闭，相关接口返回 503
    Disabled,
    /// 表已加载且非空
    Ready,
    /// 加载失败，空表运行
    Degraded,
}

impl EnrichmentState {
    pub fn of(matcher: Option<&TrackerMatcher>) -> Self {
        match matcher {
            None => EnrichmentState::Disabled,
            Some(m) if m.is_empty() => EnrichmentState::Degraded,
            Some(_) => EnrichmentState::Ready,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentState::Disabled => "disabled",
            EnrichmentState::Ready => "ready",
            EnrichmentState::Degraded => "degraded",
        }
    }
}

impl fmt::Display for EnrichmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
