//! HTTP route layer
//!
//! Handlers parse the request, call one service and reshape its result.
//! All shared state arrives through `web::Data` from the startup context.

pub mod error_code;
pub mod helpers;
pub mod middleware;
pub mod services;
pub mod types;

use actix_web::web;

use crate::runtime::StartupContext;
use services::{
    HealthState, api_health, dashboard_routes, extension_routes, identify_routes, root,
};

pub use error_code::ErrorCode;

/// 注册全部依赖与路由；服务器和集成测试共用
pub fn configure_app(cfg: &mut web::ServiceConfig, ctx: &StartupContext) {
    cfg.app_data(web::Data::new(ctx.ingest.clone()))
        .app_data(web::Data::new(ctx.blocklist.clone()))
        .app_data(web::Data::new(ctx.dashboard.clone()))
        .app_data(web::Data::new(ctx.identify.clone()))
        .app_data(web::Data::new(ctx.report.clone()))
        .app_data(web::Data::new(HealthState {
            warehouse: ctx.warehouse.clone(),
            enrichment: ctx.identify.state(),
            ai_configured: ctx.report.ai_configured(),
        }))
        .app_data(helpers::json_config())
        .app_data(helpers::query_config())
        .route("/", web::get().to(root))
        .configure(identify_routes)
        .service(
            web::scope("/api")
                .route("/health", web::get().to(api_health))
                .configure(extension_routes)
                .configure(dashboard_routes),
        );
}
