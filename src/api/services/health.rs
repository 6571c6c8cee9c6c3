//! 健康检查路由
//!
//! 只读取各依赖的"是否存在"与数据库 ping，不经过业务 service。

use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

use crate::api::helpers::success_response;
use crate::api::types::{HealthResponse, RootResponse};
use crate::enrichment::EnrichmentState;
use crate::storage::Warehouse;

pub const SERVICE_NAME: &str = "Tracker Identification API";
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// 健康检查所需的依赖快照
pub struct HealthState {
    pub warehouse: Option<Arc<Warehouse>>,
    pub enrichment: EnrichmentState,
    pub ai_configured: bool,
}

impl HealthState {
    async fn database_status(&self) -> &'static str {
        let Some(warehouse) = self.warehouse.as_deref() else {
            return "disconnected";
        };
        match tokio::time::timeout(PING_TIMEOUT, warehouse.ping()).await {
            Ok(true) => "connected",
            Ok(false) => "disconnected",
            Err(_) => {
                warn!("Database ping timed out after {:?}", PING_TIMEOUT);
                "disconnected"
            }
        }
    }
}

pub async fn root() -> impl Responder {
    trace!("Received root request");
    success_response(RootResponse {
        status: "online",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn api_health(state: web::Data<HealthState>) -> HttpResponse {
    trace!("Received health check request");
    success_response(HealthResponse {
        status: "ok",
        database: state.database_status().await,
        enrichment: state.enrichment.as_str(),
        ai: if state.ai_configured {
            "configured"
        } else {
            "unconfigured"
        },
    })
}
