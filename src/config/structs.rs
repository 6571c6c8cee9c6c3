use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogFormat::iter()
            .find(|f| f.as_ref().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let valid: Vec<String> = LogFormat::iter().map(|f| f.as_ref().to_string()).collect();
                format!("Invalid log format: '{}'. Valid: {}", s, valid.join(", "))
            })
    }
}

/// 应用配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - database: 数据仓库连接配置
/// - logging: 日志配置
/// - enrichment: entity map 加载与回填
/// - ai: Gemini 接入配置
/// - dashboard: 仪表盘查询限制
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const ENV_PREFIX: &str = "PS";

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：PS，分隔符：__
    /// 示例：PS__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let required = path != DEFAULT_CONFIG_PATH;

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（显式指定时必须存在）
            .add_source(File::with_name(path).required(required))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }

        config.apply_well_known_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `DATABASE_URL` / `GEMINI_API_KEY` 只填补空值，不覆盖显式配置
    pub fn apply_well_known_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.database.database_url.trim().is_empty()
            && let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty())
        {
            self.database.database_url = url;
        }
        if self.ai.api_key.trim().is_empty()
            && let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty())
        {
            self.ai.api_key = key;
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据仓库连接配置
///
/// `database_url` 为空时服务仍会启动，写接口软失败，读接口返回 503。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 域名 → 公司 富化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enrichment_enabled")]
    pub enabled: bool,
    #[serde(default = "default_entity_map_url")]
    pub entity_map_url: String,
    /// 本地 entity_map.json，设置后优先于 URL
    #[serde(default)]
    pub entity_map_path: Option<String>,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_backfill_batch_size")]
    pub backfill_batch_size: u64,
}

/// Gemini 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

/// 仪表盘查询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// 未携带 email 的查询是否按"全部用户"执行
    #[serde(default)]
    pub allow_unscoped_queries: bool,
    #[serde(default = "default_history_limit")]
    pub default_history_limit: u64,
    #[serde(default = "default_max_history_limit")]
    pub max_history_limit: u64,
    #[serde(default = "default_max_trend_days")]
    pub max_trend_days: u32,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_enrichment_enabled() -> bool {
    true
}

fn default_entity_map_url() -> String {
    "https://raw.githubusercontent.com/duckduckgo/tracker-radar/main/build-data/generated/entity_map.json"
        .to_string()
}

fn default_download_timeout_secs() -> u64 {
    10
}

fn default_backfill_batch_size() -> u64 {
    50
}

fn default_ai_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    60
}

fn default_history_limit() -> u64 {
    500
}

fn default_max_history_limit() -> u64 {
    5000
}

fn default_max_trend_days() -> u32 {
    90
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enrichment_enabled(),
            entity_map_url: default_entity_map_url(),
            entity_map_path: None,
            download_timeout_secs: default_download_timeout_secs(),
            backfill_batch_size: default_backfill_batch_size(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_ai_model(),
            endpoint: default_ai_endpoint(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            allow_unscoped_queries: false,
            default_history_limit: default_history_limit(),
            max_history_limit: default_max_history_limit(),
            max_trend_days: default_max_trend_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_scoped_and_sane() {
        let config = AppConfig::default();
        assert!(!config.dashboard.allow_unscoped_queries);
        assert_eq!(config.dashboard.default_history_limit, 500);
        assert_eq!(config.server.port, 8000);
        assert!(config.database.database_url.is_empty());
        assert!(config.enrichment.enabled);
    }

    #[test]
    fn test_well_known_env_fills_only_empty_values() {
        let mut config = AppConfig::default();
        config.ai.api_key = "from-file".to_string();
        config.apply_well_known_env(|key| match key {
            "DATABASE_URL" => Some("sqlite://warehouse.db".to_string()),
            "GEMINI_API_KEY" => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(config.database.database_url, "sqlite://warehouse.db");
        assert_eq!(config.ai.api_key, "from-file");
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = AppConfig::generate_sample_config();
        assert!(sample.contains("[dashboard]"));
        let parsed: AppConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.ai.model, AppConfig::default().ai.model);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[server]\nport = 9999\n").unwrap();
        assert_eq!(parsed.server.port, 9999);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.dashboard.max_trend_days, 90);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" text ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().unwrap_err().contains("text, json"));

        let parsed: AppConfig = toml::from_str("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(parsed.logging.format, LogFormat::Json);
    }
}
