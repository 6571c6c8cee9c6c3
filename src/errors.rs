use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum PrivacyShieldError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    WarehouseUnavailable(String),
    EnrichmentUnavailable(String),
    AiUnavailable(String),
    AiRequest(String),
    AiResponseParse(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    FileOperation(String),
    DateParse(String),
}

impl PrivacyShieldError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PrivacyShieldError::DatabaseConfig(_) => "E001",
            PrivacyShieldError::DatabaseConnection(_) => "E002",
            PrivacyShieldError::DatabaseOperation(_) => "E003",
            PrivacyShieldError::WarehouseUnavailable(_) => "E004",
            PrivacyShieldError::EnrichmentUnavailable(_) => "E005",
            PrivacyShieldError::AiUnavailable(_) => "E006",
            PrivacyShieldError::AiRequest(_) => "E007",
            PrivacyShieldError::AiResponseParse(_) => "E008",
            PrivacyShieldError::Validation(_) => "E009",
            PrivacyShieldError::NotFound(_) => "E010",
            PrivacyShieldError::Serialization(_) => "E011",
            PrivacyShieldError::FileOperation(_) => "E012",
            PrivacyShieldError::DateParse(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PrivacyShieldError::DatabaseConfig(_) => "Database Configuration Error",
            PrivacyShieldError::DatabaseConnection(_) => "Database Connection Error",
            PrivacyShieldError::DatabaseOperation(_) => "Database Operation Error",
            PrivacyShieldError::WarehouseUnavailable(_) => "Warehouse Unavailable",
            PrivacyShieldError::EnrichmentUnavailable(_) => "Enrichment Unavailable",
            PrivacyShieldError::AiUnavailable(_) => "AI Service Unavailable",
            PrivacyShieldError::AiRequest(_) => "AI Request Error",
            PrivacyShieldError::AiResponseParse(_) => "AI Response Parse Error",
            PrivacyShieldError::Validation(_) => "Validation Error",
            PrivacyShieldError::NotFound(_) => "Resource Not Found",
            PrivacyShieldError::Serialization(_) => "Serialization Error",
            PrivacyShieldError::FileOperation(_) => "File Operation Error",
            PrivacyShieldError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PrivacyShieldError::DatabaseConfig(msg)
            | PrivacyShieldError::DatabaseConnection(msg)
            | PrivacyShieldError::DatabaseOperation(msg)
            | PrivacyShieldError::WarehouseUnavailable(msg)
            | PrivacyShieldError::EnrichmentUnavailable(msg)
            | PrivacyShieldError::AiUnavailable(msg)
            | PrivacyShieldError::AiRequest(msg)
            | PrivacyShieldError::AiResponseParse(msg)
            | PrivacyShieldError::Validation(msg)
            | PrivacyShieldError::NotFound(msg)
            | PrivacyShieldError::Serialization(msg)
            | PrivacyShieldError::FileOperation(msg)
            | PrivacyShieldError::DateParse(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    ///
    /// 基础设施缺失（未配置数据库 / 富化 / AI）为 503，输入问题为 400，其余为 500。
    pub fn http_status(&self) -> StatusCode {
        match self {
            PrivacyShieldError::WarehouseUnavailable(_)
            | PrivacyShieldError::EnrichmentUnavailable(_)
            | PrivacyShieldError::AiUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PrivacyShieldError::Validation(_) | PrivacyShieldError::DateParse(_) => {
                StatusCode::BAD_REQUEST
            }
            PrivacyShieldError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为"基础设施不可用"一类的软失败
    pub fn is_unavailable(&self) -> bool {
        self.http_status() == StatusCode::SERVICE_UNAVAILABLE
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PrivacyShieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PrivacyShieldError {}

// 便捷的构造函数
impl PrivacyShieldError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::DatabaseOperation(msg.into())
    }

    pub fn warehouse_unavailable<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::WarehouseUnavailable(msg.into())
    }

    pub fn enrichment_unavailable<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::EnrichmentUnavailable(msg.into())
    }

    pub fn ai_unavailable<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::AiUnavailable(msg.into())
    }

    pub fn ai_request<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::AiRequest(msg.into())
    }

    pub fn ai_response_parse<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::AiResponseParse(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::FileOperation(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        PrivacyShieldError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for PrivacyShieldError {
    fn from(err: sea_orm::DbErr) -> Self {
        PrivacyShieldError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PrivacyShieldError {
    fn from(err: std::io::Error) -> Self {
        PrivacyShieldError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PrivacyShieldError {
    fn from(err: serde_json::Error) -> Self {
        PrivacyShieldError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for PrivacyShieldError {
    fn from(err: chrono::ParseError) -> Self {
        PrivacyShieldError::DateParse(err.to_string())
    }
}

impl From<ureq::Error> for PrivacyShieldError {
    fn from(err: ureq::Error) -> Self {
        PrivacyShieldError::AiRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PrivacyShieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_errors_map_to_503() {
        for err in [
            PrivacyShieldError::warehouse_unavailable("db"),
            PrivacyShieldError::enrichment_unavailable("map"),
            PrivacyShieldError::ai_unavailable("key"),
        ] {
            assert_eq!(err.http_status(), StatusCode::SERVICE_UNAVAILABLE);
            assert!(err.is_unavailable());
        }
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = PrivacyShieldError::validation("email is required");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "email is required");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_parse_error_is_internal() {
        let err = PrivacyShieldError::ai_response_parse("expected value at line 1");
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "E008");
    }

    #[test]
    fn test_db_err_conversion() {
        let err: PrivacyShieldError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, PrivacyShieldError::DatabaseOperation(_)));
        assert!(err.message().contains("boom"));
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = PrivacyShieldError::not_found("blocklist entry");
        assert_eq!(err.to_string(), "Resource Not Found: blocklist entry");
    }
}
