use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ureq::Agent;

use super::TextGenerator;
use crate::config::AiConfig;
use crate::errors::{PrivacyShieldError, Result};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// 拼接第一个候选的所有文本片段
fn extract_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PrivacyShieldError::ai_request(
            "Gemini response contained no text",
        ));
    }
    Ok(text)
}

/// Gemini `generateContent` 客户端（ureq 同步调用，放到 blocking 线程池执行）
pub struct GeminiClient {
    agent: Agent,
    url: String,
    api_key: String,
}

impl GeminiClient {
    /// 未配置 API key 时返回 `AiUnavailable`
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(PrivacyShieldError::ai_unavailable("Gemini API key is not configured"));
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.to_string(),
        })
    }

    fn generate_sync(agent: &Agent, url: &str, api_key: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let mut response = agent
            .post(url)
            .header("x-goog-api-key", api_key)
            .send_json(&request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .body_mut()
                .read_to_string()
                .unwrap_or_default();
            warn!("Gemini returned HTTP {}: {}", status, body);
            return Err(PrivacyShieldError::ai_request(format!(
                "Gemini returned HTTP {}",
                status
            )));
        }

        let parsed: GenerateResponse = response.body_mut().read_json().map_err(|e| {
            PrivacyShieldError::ai_request(format!("Malformed Gemini response: {}", e))
        })?;
        extract_text(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();
        let prompt = prompt.to_string();

        debug!("Gemini request: {} prompt chars", prompt.chars().count());
        tokio::task::spawn_blocking(move || Self::generate_sync(&agent, &url, &api_key, &prompt))
            .await
            .map_err(|e| PrivacyShieldError::ai_request(format!("Gemini task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}
