//! 扩展端路由：数据上传与屏蔽列表同步
//!
//! 写接口在数据库缺失时是软失败：HTTP 200 + `success=false`。

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::helpers::{DB_UNAVAILABLE, api_result, success_response, write_error};
use crate::api::types::{
    BlocklistAddRequest, BlocklistQuery, BlocklistRemoveRequest, BlocklistResponse,
    CookieUploadRequest, CookieUploadResponse, MessageResponse, UploadRequest, UploadResponse,
};
use crate::errors::PrivacyShieldError;
use crate::services::{BlocklistService, IngestService};

fn warehouse_missing(err: &PrivacyShieldError) -> bool {
    matches!(err, PrivacyShieldError::WarehouseUnavailable(_))
}

pub async fn upload_trackers(
    service: web::Data<Arc<IngestService>>,
    body: web::Json<UploadRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    debug!(
        "Received upload from {} ({}): {} trackers, {} cookies",
        req.email,
        req.device_id,
        req.trackers.len(),
        req.cookies.len()
    );

    match service
        .upload(&req.email, &req.device_id, &req.trackers, &req.cookies)
        .await
    {
        Ok(outcome) => success_response(UploadResponse {
            success: true,
            message: None,
            cookies_inserted: outcome.cookies_inserted,
            trackers_inserted: outcome.trackers_inserted,
        }),
        Err(e) if warehouse_missing(&e) => {
            warn!("Database not available, upload from {} not persisted", req.device_id);
            success_response(UploadResponse {
                success: false,
                message: Some(DB_UNAVAILABLE.to_string()),
                ..Default::default()
            })
        }
        Err(e) => write_error(&e, "Error uploading data"),
    }
}

pub async fn upload_cookies(
    service: web::Data<Arc<IngestService>>,
    body: web::Json<CookieUploadRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    match service
        .upload_cookies(&req.email, &req.device_id, &req.cookies)
        .await
    {
        Ok(cookies_inserted) => success_response(CookieUploadResponse {
            success: true,
            message: None,
            cookies_inserted,
        }),
        Err(e) if warehouse_missing(&e) => success_response(CookieUploadResponse {
            success: false,
            message: Some(DB_UNAVAILABLE.to_string()),
            cookies_inserted: 0,
        }),
        Err(e) => write_error(&e, "Error uploading cookies"),
    }
}

pub async fn get_blocklist(
    service: web::Data<Arc<BlocklistService>>,
    query: web::Query<BlocklistQuery>,
) -> HttpResponse {
    let email = query.email.as_deref().unwrap_or_default();
    api_result(
        service
            .list(email)
            .await
            .map(|domains| BlocklistResponse { domains }),
        "Error fetching blocklist",
    )
}

/// 写接口共用的结果映射
fn message_result(result: crate::errors::Result<&'static str>, context: &str) -> HttpResponse {
    match result {
        Ok(message) => success_response(MessageResponse {
            success: true,
            message: message.to_string(),
        }),
        Err(e) if warehouse_missing(&e) => success_response(MessageResponse {
            success: false,
            message: DB_UNAVAILABLE.to_string(),
        }),
        Err(e) => write_error(&e, context),
    }
}

pub async fn add_to_blocklist(
    service: web::Data<Arc<BlocklistService>>,
    body: web::Json<BlocklistAddRequest>,
) -> HttpResponse {
    message_result(
        service.add(&body.domain, &body.email, &body.reason).await,
        "Error adding to blocklist",
    )
}

pub async fn remove_from_blocklist(
    service: web::Data<Arc<BlocklistService>>,
    body: web::Json<BlocklistRemoveRequest>,
) -> HttpResponse {
    message_result(
        service.remove(&body.domain, &body.email).await,
        "Error removing from blocklist",
    )
}

/// 扩展端路由（挂在 `/api` 下）
pub fn extension_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/trackers", web::post().to(upload_trackers))
        .route("/cookies/upload", web::post().to(upload_cookies))
        .route("/blocklist", web::get().to(get_blocklist))
        .route("/blocklist", web::post().to(add_to_blocklist))
        .route("/blocklist", web::delete().to(remove_from_blocklist));
}
