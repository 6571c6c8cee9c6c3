//! Generative text client
//!
//! One `generateContent` call per request: no retry, no streaming.

pub mod client;
pub mod prompt;
pub mod report;

use async_trait::async_trait;

use crate::errors::Result;

pub use client::GeminiClient;
pub use report::{DomainScore, SecurityReport, parse_security_report};

/// 文本生成后端
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 用于日志的名称
    fn name(&self) -> &'static str;
}
