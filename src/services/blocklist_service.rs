//! Per-user domain blocklist

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::errors::{PrivacyShieldError, Result};
use crate::storage::Warehouse;

pub const MSG_ADDED: &str = "Domain added to blocklist";
pub const MSG_ALREADY_PRESENT: &str = "Domain already in blocklist";
pub const MSG_REMOVED: &str = "Domain removed from blocklist";
pub const MSG_NOT_PRESENT: &str = "Domain not in blocklist";

/// 规范化屏蔽域名：去空白、转小写；传入完整 URL 时只取 host
pub fn normalize_domain(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PrivacyShieldError::validation("domain is required"));
    }

    let domain = if trimmed.contains("://") {
        let parsed = Url::parse(trimmed)
            .map_err(|e| PrivacyShieldError::validation(format!("Invalid domain '{}': {}", trimmed, e)))?;
        parsed
            .host_str()
            .ok_or_else(|| PrivacyShieldError::validation(format!("No host in '{}'", trimmed)))?
            .to_string()
    } else {
        trimmed.trim_end_matches('/').to_string()
    };

    Ok(domain.to_ascii_lowercase())
}

fn require_email(email: &str) -> Result<&str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(PrivacyShieldError::validation("email is required"));
    }
    Ok(email)
}

pub struct BlocklistService {
    warehouse: Option<Arc<Warehouse>>,
}

impl BlocklistService {
    pub fn new(warehouse: Option<Arc<Warehouse>>) -> Self {
        Self { warehouse }
    }

    fn warehouse(&self) -> Result<&Warehouse> {
        self.warehouse
            .as_deref()
            .ok_or_else(|| PrivacyShieldError::warehouse_unavailable("Database not available"))
    }

    pub async fn list(&self, email: &str) -> Result<Vec<String>> {
        let email = require_email(email)?;
        self.warehouse()?.get_blocklist(email).await
    }

    /// 返回给客户端的提示语；重复添加不是错误
    pub async fn add(&self, domain: &str, email: &str, reason: &str) -> Result<&'static str> {
        let email = require_email(email)?;
        let domain = normalize_domain(domain)?;
        let warehouse = self.warehouse()?;

        let added = warehouse.add_to_blocklist(&domain, email, reason.trim()).await?;
        debug!("Blocklist add {} for {}: added={}", domain, email, added);
        Ok(if added { MSG_ADDED } else { MSG_ALREADY_PRESENT })
    }

    pub async fn remove(&self, domain: &str, email: &str) -> Result<&'static str> {
        let email = require_email(email)?;
        let domain = normalize_domain(domain)?;
        let warehouse = self.warehouse()?;

        let removed = warehouse.remove_from_blocklist(&domain, email).await?;
        Ok(if removed { MSG_REMOVED } else { MSG_NOT_PRESENT })
    }
}
