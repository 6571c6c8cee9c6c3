//! Security report parsing

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{PrivacyShieldError, Result};

pub const DEFAULT_SCORE: i64 = 50;
pub const DEFAULT_SUMMARY: &str = "Analysis complete.";
pub const CLEAN_SUMMARY: &str = "No tracking data found for this period. Your browsing appears clean!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub overall_score: Value,
    pub summary: String,
    pub top3_least: Vec<DomainScore>,
    pub domain_scores: Vec<DomainScore>,
}

impl SecurityReport {
    /// 区间内没有数据时的固定报告
    pub fn clean() -> Self {
        Self {
            overall_score: Value::from(100),
            summary: CLEAN_SUMMARY.to_string(),
            top3_least: Vec::new(),
            domain_scores: Vec::new(),
        }
    }

    fn from_scores(overall_score: Value, summary: String, domain_scores: Vec<DomainScore>) -> Self {
        let top3_least = domain_scores.iter().take(3).cloned().collect();
        Self {
            overall_score,
            summary,
            top3_least,
            domain_scores,
        }
    }
}

/// 去掉首尾可选的 ``` 代码块标记
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if text.starts_with("```") {
        // 丢掉第一行（``` 或 ```json）
        text = match text.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        };
        text = text.trim_end();
        if let Some(stripped) = text.strip_suffix("```") {
            text = stripped;
        }
    }
    text.trim()
}

/// 严格解析模型输出；不是 JSON 对象即为 `AiResponseParse`
pub fn parse_security_report(raw: &str) -> Result<SecurityReport> {
    let text = strip_code_fences(raw);
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PrivacyShieldError::ai_response_parse(format!("Invalid JSON: {}", e)))?;

    let Value::Object(mut obj) = value else {
        return Err(PrivacyShieldError::ai_response_parse(
            "Response is not a JSON object",
        ));
    };

    let overall_score = obj
        .remove("overallScore")
        .filter(|v| !v.is_null())
        .unwrap_or_else(|| Value::from(DEFAULT_SCORE));
    let summary = obj
        .remove("summary")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
    let domain_scores: Vec<DomainScore> = match obj.remove("domainScores") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => serde_json::from_value(v).map_err(|e| {
            PrivacyShieldError::ai_response_parse(format!("Invalid domainScores: {}", e))
        })?,
    };

    Ok(SecurityReport::from_scores(overall_score, summary, domain_scores))
}
