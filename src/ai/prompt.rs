//! Prompt templates

use std::fmt::Write;

use crate::storage::SecurityReportData;

/// 安全报告最多带入 prompt 的域名数
pub const MAX_REPORT_DOMAINS: usize = 50;

/// 安全报告 prompt：要求模型只返回 JSON 对象
pub fn security_report_prompt(start_date: &str, data: &SecurityReportData) -> String {
    let domain_text = data
        .domain_stats
        .iter()
        .take(MAX_REPORT_DOMAINS)
        .map(|d| {
            format!(
                "- {} (company: {}, category: {}, hits: {}, seen on {} different sites)",
                d.domain, d.company, d.category, d.total_hits, d.unique_initiators
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a cybersecurity analyst evaluating a user's web browsing privacy and security.

Here is the tracking data detected on this user's browser from {start_date} to today:

Total tracker requests: {total}
Unique websites visited: {sites}
Tracker domains detected:
{domain_text}

Analyze this data and respond with ONLY a valid JSON object (no markdown, no code fences) in this exact format:
{{
  "overallScore": <number 0-100, where 100 is most secure>,
  "summary": "<2-3 sentence analysis of the user's security posture>",
  "domainScores": [
    {{"domain": "<tracker domain>", "score": <0-100>, "reason": "<brief reason>"}},
    ...
  ]
}}

Rules for scoring:
- Advertising/tracking domains get lower scores (more privacy risk)
- Analytics domains get moderate scores
- Social media trackers get low-moderate scores
- Domains with very high hit counts get lower scores (more pervasive tracking)
- Domains seen across many different sites get lower scores
- The overall score should reflect the aggregate privacy risk
- Include ALL tracker domains from the data in domainScores
- Sort domainScores by score ascending (least secure first)"#,
        total = data.total_trackers,
        sites = data.unique_sites,
    )
}

/// 概览统计的输入
#[derive(Debug, Clone, Default)]
pub struct SummaryInput {
    pub total_trackers: i64,
    pub total_cookies: i64,
    pub unique_sites: i64,
    /// (category, count)，按数量降序
    pub categories: Vec<(String, i64)>,
    /// (company, hits)，按命中降序
    pub top_companies: Vec<(String, i64)>,
}

/// 自然语言摘要 prompt
pub fn summary_prompt(input: &SummaryInput) -> String {
    let mut prompt = String::from(
        "You are a privacy assistant inside a browser extension dashboard. \
         Write a short, friendly summary (3-4 sentences, plain text, no markdown) \
         of the user's recent tracking exposure and one practical suggestion.\n\n",
    );

    let _ = writeln!(prompt, "Tracker requests observed: {}", input.total_trackers);
    let _ = writeln!(prompt, "Cookies observed: {}", input.total_cookies);
    let _ = writeln!(prompt, "Websites that loaded trackers: {}", input.unique_sites);

    if !input.categories.is_empty() {
        prompt.push_str("Tracker categories:\n");
        for (category, count) in &input.categories {
            let _ = writeln!(prompt, "- {}: {}", category, count);
        }
    }
    if !input.top_companies.is_empty() {
        prompt.push_str("Companies tracking the user most:\n");
        for (company, hits) in &input.top_companies {
            let _ = writeln!(prompt, "- {}: {} hits", company, hits);
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DomainRisk;

    fn risk(i: usize) -> DomainRisk {
        DomainRisk {
            domain: format!("tracker{}.example", i),
            company: "Acme Ads".to_string(),
            category: "Advertising".to_string(),
            total_hits: 10,
            unique_initiators: 2,
        }
    }

    #[test]
    fn test_report_prompt_embeds_stats_and_caps_domains() {
        let data = SecurityReportData {
            total_trackers: 123,
            unique_sites: 7,
            domain_stats: (0..60).map(risk).collect(),
        };
        let prompt = security_report_prompt("2026-03-01", &data);
        assert!(prompt.contains("from 2026-03-01 to today"));
        assert!(prompt.contains("Total tracker requests: 123"));
        assert!(prompt.contains("- tracker0.example (company: Acme Ads, category: Advertising, hits: 10, seen on 2 different sites)"));
        assert!(prompt.contains("tracker49.example"));
        assert!(!prompt.contains("tracker50.example"));
        assert!(prompt.contains(r#""overallScore""#));
    }

    #[test]
    fn test_summary_prompt_lists_sections() {
        let prompt = summary_prompt(&SummaryInput {
            total_trackers: 5,
            total_cookies: 2,
            unique_sites: 1,
            categories: vec![("Advertising".to_string(), 4)],
            top_companies: vec![("Google LLC".to_string(), 9)],
        });
        assert!(prompt.contains("Tracker requests observed: 5"));
        assert!(prompt.contains("- Advertising: 4"));
        assert!(prompt.contains("- Google LLC: 9 hits"));
    }
}
