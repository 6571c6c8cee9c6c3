//! 启动装配
//!
//! 依赖逐个建立；数据库、富化表和 AI 任一缺失都只会让对应接口降级，服务照常启动。

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::ai::{GeminiClient, TextGenerator};
use crate::config::AppConfig;
use crate::enrichment::{EnrichmentState, TrackerMatcher, load_matcher};
use crate::services::{
    BlocklistService, DashboardService, IdentifyService, IngestService, ReportService,
};
use crate::storage::Warehouse;

/// 所有共享状态，按 `web::Data` 注入各 worker
#[derive(Clone)]
pub struct StartupContext {
    pub warehouse: Option<Arc<Warehouse>>,
    pub matcher: Option<Arc<TrackerMatcher>>,
    pub ingest: Arc<IngestService>,
    pub blocklist: Arc<BlocklistService>,
    pub dashboard: Arc<DashboardService>,
    pub identify: Arc<IdentifyService>,
    pub report: Arc<ReportService>,
}

impl StartupContext {
    /// 由已建立的依赖组装各 service（不做任何 IO）
    pub fn assemble(
        config: &AppConfig,
        warehouse: Option<Arc<Warehouse>>,
        matcher: Option<Arc<TrackerMatcher>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let dashboard = Arc::new(DashboardService::new(
            warehouse.clone(),
            config.dashboard.clone(),
        ));

        Self {
            ingest: Arc::new(IngestService::new(
                warehouse.clone(),
                matcher.clone(),
                config.enrichment.backfill_batch_size,
            )),
            blocklist: Arc::new(BlocklistService::new(warehouse.clone())),
            identify: Arc::new(IdentifyService::new(matcher.clone())),
            report: Arc::new(ReportService::new(
                warehouse.clone(),
                generator,
                dashboard.clone(),
            )),
            dashboard,
            warehouse,
            matcher,
        }
    }
}

async fn connect_warehouse(config: &AppConfig) -> Option<Arc<Warehouse>> {
    match Warehouse::connect(&config.database).await {
        Ok(warehouse) => {
            info!("Using warehouse backend: {}", warehouse.backend_name());
            Some(Arc::new(warehouse))
        }
        Err(e) => {
            warn!("Warehouse unavailable, data routes will degrade: {}", e);
            None
        }
    }
}

fn build_generator(config: &AppConfig) -> Option<Arc<dyn TextGenerator>> {
    match GeminiClient::new(&config.ai) {
        Ok(client) => {
            info!("AI reports enabled (model {})", config.ai.model);
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("AI reports disabled: {}", e);
            None
        }
    }
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

    let warehouse = connect_warehouse(config).await;

    let matcher = if config.enrichment.enabled {
        Some(Arc::new(load_matcher(&config.enrichment).await))
    } else {
        info!("Enrichment disabled by configuration");
        None
    };
    info!(
        "Enrichment state: {}",
        EnrichmentState::of(matcher.as_deref())
    );

    let generator = build_generator(config);
    let context = StartupContext::assemble(config, warehouse, matcher, generator);

    debug!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}
