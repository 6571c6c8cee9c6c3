//! On-demand tracker identification

use std::sync::Arc;

use tracing::debug;

use crate::enrichment::{BatchIdentification, EnrichmentState, MatcherStats, TrackerInfo, TrackerMatcher};
use crate::errors::{PrivacyShieldError, Result};

/// 单次批量识别的最大域名数
pub const MAX_BATCH_DOMAINS: usize = 1000;

pub struct IdentifyService {
    matcher: Option<Arc<TrackerMatcher>>,
}

impl IdentifyService {
    pub fn new(matcher: Option<Arc<TrackerMatcher>>) -> Self {
        Self { matcher }
    }

    pub fn state(&self) -> EnrichmentState {
        EnrichmentState::of(self.matcher.as_deref())
    }

    fn matcher(&self) -> Result<&TrackerMatcher> {
        self.matcher
            .as_deref()
            .ok_or_else(|| PrivacyShieldError::enrichment_unavailable("Tracker database not initialized"))
    }

    pub fn identify(&self, domain: &str) -> Result<TrackerInfo> {
        let matcher = self.matcher()?;
        if domain.trim().is_empty() {
            return Err(PrivacyShieldError::validation("domain is required"));
        }
        Ok(matcher.identify(domain))
    }

    pub fn identify_batch(&self, domains: &[String]) -> Result<BatchIdentification> {
        let matcher = self.matcher()?;
        if domains.len() > MAX_BATCH_DOMAINS {
            return Err(PrivacyShieldError::validation(format!(
                "Too many domains: {} (max {})",
                domains.len(),
                MAX_BATCH_DOMAINS
            )));
        }
        let result = matcher.identify_batch(domains);
        debug!("Identified {} domains ({} unique)", domains.len(), result.0.len());
        Ok(result)
    }

    pub fn stats(&self) -> Result<MatcherStats> {
        Ok(self.matcher()?.stats())
    }
}
