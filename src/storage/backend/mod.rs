//! SeaORM warehouse backend
//!
//! Supports SQLite, MySQL/MariaDB and PostgreSQL. Every statement acquires a
//! pooled connection for its own duration; nothing is held across calls.

mod analytics;
mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::errors::{PrivacyShieldError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{cookie_to_active_model, tracker_to_active_model, truncate_chars};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(PrivacyShieldError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 连接池化的数据仓库
#[derive(Clone)]
pub struct Warehouse {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl Warehouse {
    /// 建立连接池并执行迁移
    ///
    /// URL 为空时返回 `DatabaseConfig` 错误，调用方据此降级运行。
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.trim();
        if database_url.is_empty() {
            return Err(PrivacyShieldError::database_config(
                "database_url is not set",
            ));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config.timeout).await?
        } else {
            connect_generic(database_url, &backend_name, config).await?
        };

        let warehouse = Warehouse {
            db,
            backend_name,
            retry_config,
        };

        run_migrations(&warehouse.db).await?;

        info!(
            "{} warehouse initialized",
            warehouse.backend_name.to_uppercase()
        );
        Ok(warehouse)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub(crate) fn db_backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    /// 健康检查用的轻量探测
    pub async fn ping(&self) -> bool {
        match self.db.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Warehouse ping failed: {}", e);
                false
            }
        }
    }

    /// 关闭连接池（优雅停机时调用）
    pub async fn close(self) -> Result<()> {
        self.db
            .close()
            .await
            .map_err(|e| PrivacyShieldError::database_connection(format!("Failed to close pool: {}", e)))
    }
}
