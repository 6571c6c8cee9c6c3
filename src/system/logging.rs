//! Logging system initialization

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::{LogFormat, LoggingConfig};

const DEFAULT_LOG_NAME: &str = "privacy-shield.log";

type BoxedWriter = Box<dyn std::io::Write + Send + Sync>;

/// 根据配置选择输出目标：滚动文件、追加文件或 stdout
fn build_writer(config: &LoggingConfig) -> Result<BoxedWriter> {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if !config.enable_rotation {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file))?;
        return Ok(Box::new(file));
    }

    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(DEFAULT_LOG_NAME);

    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(filename.trim_end_matches(".log"))
        .filename_suffix("log")
        .max_log_files(config.max_backups.max(1) as usize)
        .build(dir)
        .with_context(|| format!("Failed to create rolling log appender in {}", dir.display()))?;
    Ok(Box::new(appender))
}

/// Initialize logging system based on configuration
///
/// 返回的 `WorkerGuard` 必须在程序运行期间保持存活，否则缓冲中的日志会丢失。
/// 只能调用一次。
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer = build_writer(config)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level filter '{}'", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.file.as_deref().is_none_or(str::is_empty));

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_file_writer_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let config = LoggingConfig {
            file: Some(path.display().to_string()),
            enable_rotation: false,
            ..Default::default()
        };
        let mut writer = build_writer(&config).unwrap();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rotating_writer_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file: Some(dir.path().join("shield.log").display().to_string()),
            enable_rotation: true,
            max_backups: 2,
            ..Default::default()
        };
        assert!(build_writer(&config).is_ok());
    }
}
