//! Retry for warehouse reads
//!
//! Transient failures (pool exhaustion, dropped connections, lock contention)
//! are retried with exponential backoff plus jitter. Everything else fails fast.

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 可重试的数据库错误码：MySQL 死锁/锁超时，PostgreSQL 序列化失败/死锁，SQLite BUSY/LOCKED
const RETRYABLE_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

const RETRYABLE_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "serialization failure",
];

/// 判断数据库错误是否值得重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => is_transient(runtime),
        _ => false,
    }
}

fn is_transient(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            let code = sqlx_err
                .as_database_error()
                .and_then(|db_err| db_err.code().map(|c| c.to_string()));
            if let Some(code) = code {
                return RETRYABLE_CODES.contains(&code.as_str());
            }
            message_is_transient(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => message_is_transient(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn message_is_transient(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    RETRYABLE_MESSAGES.iter().any(|m| lower.contains(m))
}

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// 以指数退避执行 `operation`，仅对瞬时错误重试
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if attempt >= config.max_retries || !is_retryable_error(&err) {
            return Err(err);
        }

        attempt += 1;
        let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
        warn!(
            "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
            operation_name,
            attempt,
            config.max_retries + 1,
            err,
            delay
        );
        sleep(Duration::from_millis(delay)).await;
    }
}

/// base * 2^(attempt-1)，封顶 max，再加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::Rng;
    let exp = base_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(32));
    let capped = exp.min(max_ms);
    capped.saturating_add(rand::rng().random_range(0..=capped / 4))
}
