//! Tracker 识别路由：`/identify`、`/identify/batch`、`/stats`

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::api::helpers::api_result;
use crate::api::types::{BatchDomainRequest, DomainRequest};
use crate::services::IdentifyService;

pub async fn identify(
    service: web::Data<Arc<IdentifyService>>,
    body: web::Json<DomainRequest>,
) -> HttpResponse {
    api_result(service.identify(&body.domain), "Error identifying domain")
}

pub async fn identify_batch(
    service: web::Data<Arc<IdentifyService>>,
    body: web::Json<BatchDomainRequest>,
) -> HttpResponse {
    api_result(
        service.identify_batch(&body.domains),
        "Error identifying domains",
    )
}

pub async fn stats(service: web::Data<Arc<IdentifyService>>) -> HttpResponse {
    api_result(service.stats(), "Error retrieving stats")
}

/// 识别路由（挂在根路径下）
pub fn identify_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/identify", web::post().to(identify))
        .route("/identify/batch", web::post().to(identify_batch))
        .route("/stats", web::get().to(stats));
}
