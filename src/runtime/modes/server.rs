//! Server mode
//!
//! Wires the startup context into an actix-web server and runs it until a
//! shutdown signal arrives.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::configure_app;
use crate::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::config::AppConfig;
use crate::runtime::lifetime;

/// worker 数上限
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: AppConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let warehouse_for_shutdown = startup.warehouse.clone();
    let workers = config.server.cpu_count.clamp(1, MAX_WORKERS);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Using {} workers for the server", workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware) // 最外层，记录请求延迟
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .configure(|cfg| configure_app(cfg, &startup))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .workers(workers)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::wait_for_signal() => {
            info!("Stopping HTTP server gracefully...");
            handle.stop(true).await;
        }
    }

    lifetime::shutdown::close_warehouse(warehouse_for_shutdown).await;
    info!("Shutdown complete");
    Ok(())
}
