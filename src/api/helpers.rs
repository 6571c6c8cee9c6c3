//! API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error, web};
use serde::Serialize;
use tracing::{error, warn};

use super::error_code::ErrorCode;
use super::types::ErrorBody;
use crate::errors::PrivacyShieldError;

/// 写接口在数据库缺失时返回的提示
pub const DB_UNAVAILABLE: &str = "Database not available";
/// AI 输出无法解析时的固定提示
pub const AI_PARSE_FAILED: &str = "Failed to parse AI response";

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, &data)
}

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &ErrorBody {
            code: code as i32,
            message: message.to_string(),
        },
    )
}

/// 路由级错误映射
///
/// 输入错误和依赖缺失原样返回消息；其余为 500，客户端只看到 `context`，细节写日志。
pub fn route_error(err: &PrivacyShieldError, context: &str) -> HttpResponse {
    let status = err.http_status();
    let code = ErrorCode::from(err);

    if status.is_client_error() || status == StatusCode::SERVICE_UNAVAILABLE {
        warn!("{}: {}", context, err);
        return error_response(status, code, err.message());
    }

    error!("{}: {}", context, err);
    match err {
        PrivacyShieldError::AiResponseParse(_) => error_response(status, code, AI_PARSE_FAILED),
        _ => error_response(status, code, context),
    }
}

/// 写接口的错误映射：数据库类失败归为写失败
pub fn write_error(err: &PrivacyShieldError, context: &str) -> HttpResponse {
    match err {
        PrivacyShieldError::DatabaseOperation(_) | PrivacyShieldError::DatabaseConnection(_) => {
            error!("{}: {}", context, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::WarehouseWriteFailed,
                context,
            )
        }
        _ => route_error(err, context),
    }
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>, context: &str) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => route_error(&e, context),
    }
}

fn bad_request(message: String) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message)
}

/// JSON body 解析失败统一返回 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4 * 1024 * 1024)
        .error_handler(|err, _req: &HttpRequest| {
            let response = bad_request(format!("Invalid request body: {}", err));
            error::InternalError::from_response(err, response).into()
        })
}

/// Query string 解析失败统一返回 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = bad_request(format!("Invalid query string: {}", err));
        error::InternalError::from_response(err, response).into()
    })
}
