//! Entity map loading (local file or HTTP download)

use std::time::Duration;

use tracing::{info, warn};
use ureq::Agent;

use super::matcher::TrackerMatcher;
use crate::config::EnrichmentConfig;
use crate::errors::{PrivacyShieldError, Result};

/// entity_map.json 目前约数 MB，给足余量
const MAX_ENTITY_MAP_BYTES: u64 = 64 * 1024 * 1024;

/// 从本地文件读取
pub fn load_from_file(path: &str) -> Result<TrackerMatcher> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PrivacyShieldError::file_operation(format!("Cannot read entity map {}: {}", path, e))
    })?;
    TrackerMatcher::from_json(&raw)
}

/// 同步下载（在 spawn_blocking 中调用）
fn download_sync(url: &str, timeout: Duration) -> Result<TrackerMatcher> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();

    let raw = agent
        .get(url)
        .call()
        .map_err(|e| PrivacyShieldError::enrichment_unavailable(format!("Download failed: {}", e)))?
        .into_body()
        .with_config()
        .limit(MAX_ENTITY_MAP_BYTES)
        .read_to_string()
        .map_err(|e| {
            PrivacyShieldError::enrichment_unavailable(format!("Reading body failed: {}", e))
        })?;

    TrackerMatcher::from_json(&raw)
}

pub async fn download(url: &str, timeout: Duration) -> Result<TrackerMatcher> {
    let url = url.to_string();
    tokio::task::spawn_blocking(move || download_sync(&url, timeout))
        .await
        .map_err(|e| PrivacyShieldError::enrichment_unavailable(format!("Loader task failed: {}", e)))?
}

/// 按配置加载 entity map
///
/// 本地路径优先；任何失败都降级为空表（查询一律返回 Unknown），不会让启动失败。
pub async fn load_matcher(config: &EnrichmentConfig) -> TrackerMatcher {
    let result = match config.entity_map_path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => load_from_file(path),
        None => {
            download(
                &config.entity_map_url,
                Duration::from_secs(config.download_timeout_secs.max(1)),
            )
            .await
        }
    };

    match result {
        Ok(matcher) => {
            info!("Tracker database loaded: {} companies", matcher.company_count());
            matcher
        }
        Err(e) => {
            warn!("Tracker database unavailable, enrichment degraded: {}", e);
            TrackerMatcher::empty()
        }
    }
}
