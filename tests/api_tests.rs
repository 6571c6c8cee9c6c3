//! HTTP API integration tests
//!
//! The app is built with the same `configure_app` the server uses, over a
//! temporary SQLite warehouse and a scripted text generator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, dev::ServiceResponse};
use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use privacy_shield::ai::TextGenerator;
use privacy_shield::api::configure_app;
use privacy_shield::config::{AppConfig, DatabaseConfig};
use privacy_shield::enrichment::TrackerMatcher;
use privacy_shield::errors::Result;
use privacy_shield::runtime::StartupContext;
use privacy_shield::storage::Warehouse;

// =============================================================================
// Test Setup
// =============================================================================

const ENTITY_MAP: &str = r#"{
    "Google LLC": {"properties": ["google.com", "doubleclick.net", "google-analytics.com"]},
    "Hotjar Ltd": {"properties": ["hotjar.com"]}
}"#;

const EMAIL: &str = "alice@example.com";

/// 按固定文本回复的生成器，记录调用次数
struct ScriptedGenerator {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

async fn temp_warehouse() -> (Arc<Warehouse>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("api_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    let warehouse = Warehouse::connect(&config)
        .await
        .expect("Failed to create warehouse");
    (Arc::new(warehouse), temp_dir)
}

fn matcher() -> Arc<TrackerMatcher> {
    Arc::new(TrackerMatcher::from_json(ENTITY_MAP).expect("valid entity map"))
}

/// 所有依赖齐全的上下文
async fn full_context(generator: Option<Arc<dyn TextGenerator>>) -> (StartupContext, TempDir) {
    let (warehouse, dir) = temp_warehouse().await;
    let ctx = StartupContext::assemble(
        &AppConfig::default(),
        Some(warehouse),
        Some(matcher()),
        generator,
    );
    (ctx, dir)
}

/// 什么都没有的降级上下文
fn bare_context() -> StartupContext {
    StartupContext::assemble(&AppConfig::default(), None, None, None)
}

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(App::new().configure(|cfg| configure_app(cfg, &$ctx))).await
    };
}

async fn json_body(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

fn upload_payload() -> Value {
    json!({
        "email": EMAIL,
        "deviceId": "device-1",
        "trackers": [
            {"domain": "doubleclick.net", "fullUrl": "https://doubleclick.net/a", "type": "script",
             "initiator": "news.example.com", "company": "Google LLC", "category": "Advertising",
             "occurrences": 4},
            {"domain": "hotjar.com", "fullUrl": "https://hotjar.com/b", "type": "xhr",
             "initiator": "shop.example.com"}
        ],
        "cookies": [
            {"name": "_ga", "domain": ".google-analytics.com", "isThirdParty": true,
             "isTracker": true, "persistent": true}
        ],
        "timestamp": "2026-01-01T00:00:00Z"
    })
}

// =============================================================================
// 健康检查
// =============================================================================

#[actix_web::test]
async fn test_root_and_health_degraded() {
    let ctx = bare_context();
    let app = app!(ctx);

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "online");
    assert_eq!(body["service"], "Tracker Identification API");

    let resp = test::call_service(&app, TestRequest::get().uri("/api/health").to_request()).await;
    let body = json_body(resp).await;
    assert_eq!(body["database"], "disconnected");
    assert_eq!(body["enrichment"], "disabled");
    assert_eq!(body["ai"], "unconfigured");
}

#[actix_web::test]
async fn test_health_with_dependencies() {
    let (ctx, _dir) = full_context(Some(ScriptedGenerator::new("{}"))).await;
    let app = app!(ctx);

    let resp = test::call_service(&app, TestRequest::get().uri("/api/health").to_request()).await;
    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["enrichment"], "ready");
    assert_eq!(body["ai"], "configured");
}

// =============================================================================
// 降级与输入校验
// =============================================================================

#[actix_web::test]
async fn test_writes_soft_fail_without_database() {
    let ctx = bare_context();
    let app = app!(ctx);

    let req = TestRequest::post()
        .uri("/api/trackers")
        .set_json(upload_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Database not available");

    let req = TestRequest::post()
        .uri("/api/blocklist")
        .set_json(json!({"domain": "ads.com", "email": EMAIL}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["success"], false);
}

#[actix_web::test]
async fn test_reads_return_503_without_database() {
    let ctx = bare_context();
    let app = app!(ctx);

    for uri in [
        "/api/overview?email=alice@example.com",
        "/api/trends?email=alice@example.com",
        "/api/insights?email=alice@example.com",
        "/api/blocklist?email=alice@example.com",
        "/api/security-report?email=alice@example.com",
    ] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        assert_eq!(json_body(resp).await["code"], 3000, "{}", uri);
    }
}

#[actix_web::test]
async fn test_validation_errors_are_400() {
    let (ctx, _dir) = full_context(None).await;
    let app = app!(ctx);

    // 缺 email 的仪表盘查询
    let resp = test::call_service(&app, TestRequest::get().uri("/api/overview").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "email is required");

    // 上传缺 deviceId
    let req = TestRequest::post()
        .uri("/api/trackers")
        .set_json(json!({"email": EMAIL, "deviceId": " "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 非法 JSON
    let req = TestRequest::post()
        .uri("/api/blocklist")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], 1000);

    // 日期格式不对
    let req = TestRequest::get()
        .uri("/api/security-report?email=alice@example.com&start_date=01-02-2026")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 非数字的 limit
    let req = TestRequest::get()
        .uri("/api/cookies?email=alice@example.com&limit=lots")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// 上传与仪表盘
// =============================================================================

#[actix_web::test]
async fn test_upload_then_dashboard() {
    let (ctx, _dir) = full_context(None).await;
    let app = app!(ctx);

    let req = TestRequest::post()
        .uri("/api/trackers")
        .set_json(upload_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["trackers_inserted"], 2);
    assert_eq!(body["cookies_inserted"], 1);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/overview?email=alice@example.com").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["totalTrackers"], 2);
    assert_eq!(body["totalCookies"], 1);
    assert_eq!(body["totalEvents"], 3);
    assert_eq!(body["uniqueSites"], 2);
    let series = body["timeSeries"].as_array().unwrap();
    assert_eq!(series.len(), 7);
    // 窗口按 UTC 日期结束，刚上传的事件落在最后一个点上
    let utc_today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let last = series.last().unwrap();
    assert_eq!(last["date"], utc_today.as_str());
    assert_eq!(last["isReal"], true);
    assert_eq!(last["value"], 2);

    // 上传后回填：hotjar.com 得到公司标签
    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/trackers/history?email=alice@example.com")
            .to_request(),
    )
    .await;
    let body = json_body(resp).await;
    let trackers = body["trackers"].as_array().unwrap();
    let hotjar = trackers.iter().find(|t| t["domain"] == "hotjar.com").unwrap();
    assert_eq!(hotjar["company"], "Hotjar Ltd");

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/breakdown?email=alice@example.com").to_request(),
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["totalTrackers"], 2);
    assert_eq!(body["companyGroups"].as_array().unwrap().len(), 2);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/cookies?email=alice@example.com&limit=10")
            .to_request(),
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["stats"]["totalCookies"], 1);
    assert_eq!(body["cookies"][0]["cookieName"], "_ga");

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/trends?email=alice@example.com&days=3")
            .to_request(),
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["trackerDaily"].as_array().unwrap().len(), 3);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/insights?email=alice@example.com").to_request(),
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["byCompany"][0]["company"], "Google LLC");
    assert_eq!(body["byCompany"][0]["totalOccurrences"], 4);

    // 其他用户看不到
    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/overview?email=bob@example.com").to_request(),
    )
    .await;
    assert_eq!(json_body(resp).await["totalTrackers"], 0);
}

#[actix_web::test]
async fn test_cookie_only_upload() {
    let (ctx, _dir) = full_context(None).await;
    let app = app!(ctx);

    let req = TestRequest::post()
        .uri("/api/cookies/upload")
        .set_json(json!({
            "email": EMAIL,
            "deviceId": "device-1",
            "cookies": [{"name": "sid", "domain": "example.com"}, {"name": "_fbp", "domain": ".facebook.com"}]
        }))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["cookies_inserted"], 2);
    assert!(body.get("message").is_none());
}

// =============================================================================
// 屏蔽列表
// =============================================================================

#[actix_web::test]
async fn test_blocklist_round_trip() {
    let (ctx, _dir) = full_context(None).await;
    let app = app!(ctx);

    let add = |domain: &str| {
        TestRequest::post()
            .uri("/api/blocklist")
            .set_json(json!({"domain": domain, "email": EMAIL, "reason": "manual"}))
            .to_request()
    };

    let body = json_body(test::call_service(&app, add("https://Ads.Example.com/")).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Domain added to blocklist");

    // 规范化之后是同一个域名
    let body = json_body(test::call_service(&app, add("ads.example.com")).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Domain already in blocklist");

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/blocklist?email=alice@example.com&deviceId=device-1")
            .to_request(),
    )
    .await;
    assert_eq!(json_body(resp).await["domains"], json!(["ads.example.com"]));

    let req = TestRequest::delete()
        .uri("/api/blocklist")
        .set_json(json!({"domain": "ads.example.com", "email": EMAIL}))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["message"], "Domain removed from blocklist");

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/blocklist?email=alice@example.com").to_request(),
    )
    .await;
    assert_eq!(json_body(resp).await["domains"], json!([]));
}

// =============================================================================
// AI 报告
// =============================================================================

/// 先写入一批上传数据
macro_rules! seed {
    ($app:expr) => {{
        let req = TestRequest::post()
            .uri("/api/trackers")
            .set_json(upload_payload())
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }};
}

#[actix_web::test]
async fn test_security_report_clean_without_calling_model() {
    let generator = ScriptedGenerator::new("should not be used");
    let (ctx, _dir) = full_context(Some(generator.clone())).await;
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/security-report?email=alice@example.com")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["overallScore"], 100);
    assert_eq!(body["domainScores"], json!([]));
    assert_eq!(generator.calls(), 0);
}

#[actix_web::test]
async fn test_security_report_parses_model_output() {
    let reply = "```json\n{\"overallScore\": 35, \"summary\": \"Heavy ad tracking.\", \"domainScores\": [{\"domain\": \"doubleclick.net\", \"score\": 20, \"reason\": \"ads\"}]}\n```";
    let generator = ScriptedGenerator::new(reply);
    let (ctx, _dir) = full_context(Some(generator.clone())).await;
    let app = app!(ctx);
    seed!(app);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/security-report?email=alice@example.com")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["overallScore"], 35);
    assert_eq!(body["top3Least"][0]["domain"], "doubleclick.net");
    assert_eq!(generator.calls(), 1);
}

#[actix_web::test]
async fn test_security_report_unparseable_output() {
    let (ctx, _dir) = full_context(Some(ScriptedGenerator::new("I cannot help with that."))).await;
    let app = app!(ctx);
    seed!(app);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/security-report?email=alice@example.com")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Failed to parse AI response");
    assert_eq!(body["code"], 5002);
}

#[actix_web::test]
async fn test_security_report_without_ai() {
    let (ctx, _dir) = full_context(None).await;
    let app = app!(ctx);
    seed!(app);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/security-report?email=alice@example.com")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(resp).await["code"], 5000);
}

#[actix_web::test]
async fn test_summary() {
    let generator = ScriptedGenerator::new("  You were tracked by Google a lot.\n");
    let (ctx, _dir) = full_context(Some(generator.clone())).await;
    let app = app!(ctx);
    seed!(app);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/summary?email=alice@example.com").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await["summary"],
        "You were tracked by Google a lot."
    );
    assert_eq!(generator.calls(), 1);
}

// =============================================================================
// 识别
// =============================================================================

#[actix_web::test]
async fn test_identify_routes() {
    let (ctx, _dir) = full_context(None).await;
    let app = app!(ctx);

    let req = TestRequest::post()
        .uri("/identify")
        .set_json(json!({"domain": "https://www.doubleclick.net/pixel"}))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["company"], "Google LLC");
    assert_eq!(body["is_tracker"], true);

    let req = TestRequest::post()
        .uri("/identify/batch")
        .set_json(json!({"domains": ["hotjar.com", "unknown-site.org"]}))
        .to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["hotjar.com"]["company"], "Hotjar Ltd");
    assert_eq!(body["unknown-site.org"]["is_tracker"], false);

    let resp = test::call_service(&app, TestRequest::get().uri("/stats").to_request()).await;
    let body = json_body(resp).await;
    assert_eq!(body["total_companies"], 2);
    assert_eq!(body["total_trackers"], 4);
}

#[actix_web::test]
async fn test_identify_without_matcher() {
    let ctx = bare_context();
    let app = app!(ctx);

    let req = TestRequest::post()
        .uri("/identify")
        .set_json(json!({"domain": "doubleclick.net"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(resp).await["code"], 4000);
}

// =============================================================================
// 中间件
// =============================================================================

#[actix_web::test]
async fn test_request_id_header() {
    use privacy_shield::api::middleware::RequestIdMiddleware;

    let ctx = bare_context();
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .configure(|cfg| configure_app(cfg, &ctx)),
    )
    .await;

    let req = TestRequest::get()
        .uri("/")
        .insert_header(("X-Request-ID", "ext-abc_123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "ext-abc_123");
}
