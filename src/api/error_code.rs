//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::PrivacyShieldError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 数据仓库错误
/// - 4000-4099: 富化错误
/// - 5000-5099: AI 错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 数据仓库 3000-3099
    WarehouseUnavailable = 3000,
    WarehouseQueryFailed = 3001,
    WarehouseWriteFailed = 3002,

    // 富化 4000-4099
    EnrichmentUnavailable = 4000,

    // AI 5000-5099
    AiUnavailable = 5000,
    AiRequestFailed = 5001,
    AiResponseInvalid = 5002,
}

impl From<&PrivacyShieldError> for ErrorCode {
    fn from(err: &PrivacyShieldError) -> Self {
        match err {
            PrivacyShieldError::WarehouseUnavailable(_) => ErrorCode::WarehouseUnavailable,
            PrivacyShieldError::EnrichmentUnavailable(_) => ErrorCode::EnrichmentUnavailable,
            PrivacyShieldError::AiUnavailable(_) => ErrorCode::AiUnavailable,
            PrivacyShieldError::AiRequest(_) => ErrorCode::AiRequestFailed,
            PrivacyShieldError::AiResponseParse(_) => ErrorCode::AiResponseInvalid,
            PrivacyShieldError::Validation(_) | PrivacyShieldError::DateParse(_) => {
                ErrorCode::BadRequest
            }
            PrivacyShieldError::NotFound(_) => ErrorCode::NotFound,
            PrivacyShieldError::DatabaseConfig(_)
            | PrivacyShieldError::DatabaseConnection(_)
            | PrivacyShieldError::DatabaseOperation(_) => ErrorCode::WarehouseQueryFailed,
            PrivacyShieldError::Serialization(_) | PrivacyShieldError::FileOperation(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}
