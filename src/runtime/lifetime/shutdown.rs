use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::Warehouse;

/// 关闭连接池的超时时间（秒）
const CLOSE_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C 或 SIGTERM
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}

/// 服务器停止后关闭连接池
pub async fn close_warehouse(warehouse: Option<Arc<Warehouse>>) {
    let Some(warehouse) = warehouse else {
        return;
    };

    // 其它 Arc 持有者可能还在，关闭的是共享的连接池
    let owned = Arc::unwrap_or_clone(warehouse);
    match timeout(Duration::from_secs(CLOSE_TIMEOUT_SECS), owned.close()).await {
        Ok(Ok(())) => info!("Warehouse connection pool closed"),
        Ok(Err(e)) => error!("Failed to close warehouse pool: {}", e),
        Err(_) => error!(
            "Closing warehouse pool timed out after {} seconds",
            CLOSE_TIMEOUT_SECS
        ),
    }
}
