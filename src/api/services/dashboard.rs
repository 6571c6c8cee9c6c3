//! 仪表盘路由：统计视图、安全报告与摘要

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::api::helpers::{api_result, route_error};
use crate::api::types::{EmailQuery, LimitQuery, ReportQuery, SummaryResponse, TrendsQuery};
use crate::services::{DashboardService, ReportService};

/// 解析作用域，失败时直接返回错误响应
macro_rules! scope_or_return {
    ($service:expr, $email:expr, $context:expr) => {
        match $service.resolve_scope($email) {
            Ok(scope) => scope,
            Err(e) => return route_error(&e, $context),
        }
    };
}

pub async fn overview(
    service: web::Data<Arc<DashboardService>>,
    query: web::Query<EmailQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error fetching overview";
    let scope = scope_or_return!(service, query.email.as_deref(), CONTEXT);
    api_result(service.overview(&scope).await, CONTEXT)
}

pub async fn trends(
    service: web::Data<Arc<DashboardService>>,
    query: web::Query<TrendsQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error fetching trends";
    let scope = scope_or_return!(service, query.email.as_deref(), CONTEXT);
    api_result(service.trends(&scope, query.days).await, CONTEXT)
}

pub async fn breakdown(
    service: web::Data<Arc<DashboardService>>,
    query: web::Query<EmailQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error fetching breakdown";
    let scope = scope_or_return!(service, query.email.as_deref(), CONTEXT);
    api_result(service.breakdown(&scope).await, CONTEXT)
}

pub async fn cookies(
    service: web::Data<Arc<DashboardService>>,
    query: web::Query<LimitQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error fetching cookies";
    let scope = scope_or_return!(service, query.email.as_deref(), CONTEXT);
    api_result(service.cookies(&scope, query.limit).await, CONTEXT)
}

pub async fn tracker_history(
    service: web::Data<Arc<DashboardService>>,
    query: web::Query<LimitQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error fetching tracker history";
    let scope = scope_or_return!(service, query.email.as_deref(), CONTEXT);
    api_result(service.tracker_history(&scope, query.limit).await, CONTEXT)
}

pub async fn insights(
    service: web::Data<Arc<DashboardService>>,
    query: web::Query<EmailQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error fetching insights";
    let scope = scope_or_return!(service, query.email.as_deref(), CONTEXT);
    api_result(service.insights(&scope).await, CONTEXT)
}

pub async fn security_report(
    dashboard: web::Data<Arc<DashboardService>>,
    reports: web::Data<Arc<ReportService>>,
    query: web::Query<ReportQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error generating security report";
    let scope = scope_or_return!(dashboard, query.email.as_deref(), CONTEXT);
    api_result(
        reports
            .security_report(&scope, query.start_date.as_deref())
            .await,
        CONTEXT,
    )
}

pub async fn summary(
    dashboard: web::Data<Arc<DashboardService>>,
    reports: web::Data<Arc<ReportService>>,
    query: web::Query<EmailQuery>,
) -> HttpResponse {
    const CONTEXT: &str = "Error generating summary";
    let scope = scope_or_return!(dashboard, query.email.as_deref(), CONTEXT);
    api_result(
        reports
            .summary(&scope)
            .await
            .map(|summary| SummaryResponse { summary }),
        CONTEXT,
    )
}

/// 仪表盘路由（挂在 `/api` 下）
pub fn dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/overview", web::get().to(overview))
        .route("/trends", web::get().to(trends))
        .route("/breakdown", web::get().to(breakdown))
        .route("/cookies", web::get().to(cookies))
        .route("/trackers/history", web::get().to(tracker_history))
        .route("/insights", web::get().to(insights))
        .route("/security-report", web::get().to(security_report))
        .route("/summary", web::get().to(summary));
}
