//! Domain → company matching against the DuckDuckGo entity map

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::errors::{PrivacyShieldError, Result};

pub const UNKNOWN: &str = "Unknown";

/// 分类关键字，按优先级排列；第一个命中的桶生效
const CATEGORY_BUCKETS: &[(&str, &[&str])] = &[
    (
        "Advertising",
        &["google", "facebook", "doubleclick", "ad", "advertising"],
    ),
    ("Analytics", &["analytics", "metric", "chartbeat"]),
    ("Social", &["social", "twitter", "instagram", "tiktok"]),
];
const DEFAULT_CATEGORY: &str = "Tracking";

/// 匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyMatch {
    pub company: String,
    pub category: String,
}

impl CompanyMatch {
    fn unknown() -> Self {
        Self {
            company: UNKNOWN.to_string(),
            category: UNKNOWN.to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.company != UNKNOWN
    }
}

/// `/identify` 的返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerInfo {
    pub domain: String,
    pub company: String,
    pub category: String,
    pub description: String,
    pub is_tracker: bool,
}

/// 按请求顺序输出的 domain → TrackerInfo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchIdentification(pub Vec<(String, TrackerInfo)>);

impl Serialize for BatchIdentification {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (domain, info) in &self.0 {
            map.serialize_entry(domain, info)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatcherStats {
    pub total_trackers: usize,
    pub total_companies: usize,
    pub categories: Vec<String>,
}

/// 待富化的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub domain: String,
    pub company: Option<String>,
    pub category: Option<String>,
}

struct CompanyEntry {
    name: String,
    properties: Vec<String>,
}

/// 只读的 entity map 匹配器，启动时构建一次
pub struct TrackerMatcher {
    companies: Vec<CompanyEntry>,
}

impl TrackerMatcher {
    /// 空表：所有查询都返回 Unknown
    pub fn empty() -> Self {
        Self {
            companies: Vec::new(),
        }
    }

    /// 解析 entity_map.json，保持源文件中的公司顺序
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            PrivacyShieldError::serialization("entity map must be a JSON object")
        })?;

        let companies = map
            .iter()
            .map(|(name, entry)| CompanyEntry {
                name: name.clone(),
                properties: entry
                    .get("properties")
                    .and_then(Value::as_array)
                    .map(|props| {
                        props
                            .iter()
                            .filter_map(Value::as_str)
                            .map(|p| p.trim().to_lowercase())
                            .filter(|p| !p.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        Ok(Self { companies })
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn company_count(&self) -> usize {
        self.companies.len()
    }

    /// 双向子串包含匹配，源顺序中第一个命中的公司生效
    pub fn lookup(&self, domain: &str) -> CompanyMatch {
        let cleaned = clean_domain(domain);
        if cleaned.is_empty() {
            return CompanyMatch::unknown();
        }

        self.companies
            .iter()
            .find(|entry| {
                entry
                    .properties
                    .iter()
                    .any(|prop| prop.contains(&cleaned) || cleaned.contains(prop.as_str()))
            })
            .map(|entry| CompanyMatch {
                company: entry.name.clone(),
                category: category_for_company(&entry.name).to_string(),
            })
            .unwrap_or_else(CompanyMatch::unknown)
    }

    pub fn identify(&self, domain: &str) -> TrackerInfo {
        let found = self.lookup(domain);
        let description = if found.is_known() {
            format!("{} tracker operated by {}", found.category, found.company)
        } else {
            "Not found in the tracker database".to_string()
        };

        TrackerInfo {
            domain: domain.to_string(),
            is_tracker: found.is_known(),
            company: found.company,
            category: found.category,
            description,
        }
    }

    /// 重复的域名只保留第一次出现的位置
    pub fn identify_batch(&self, domains: &[String]) -> BatchIdentification {
        let mut out: Vec<(String, TrackerInfo)> = Vec::with_capacity(domains.len());
        for domain in domains {
            if out.iter().any(|(seen, _)| seen == domain) {
                continue;
            }
            out.push((domain.clone(), self.identify(domain)));
        }
        BatchIdentification(out)
    }

    pub fn stats(&self) -> MatcherStats {
        let mut categories: Vec<String> = Vec::new();
        for entry in &self.companies {
            let category = category_for_company(&entry.name);
            if !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
        }
        categories.sort();

        MatcherStats {
            total_trackers: self.companies.iter().map(|c| c.properties.len()).sum(),
            total_companies: self.companies.len(),
            categories,
        }
    }

    /// 已有非空公司标签（包括 `Unknown`）的记录原样返回
    pub fn enrich(&self, record: EnrichmentRecord) -> EnrichmentRecord {
        let labeled = record
            .company
            .as_deref()
            .map(str::trim)
            .is_some_and(|c| !c.is_empty());
        if labeled {
            return record;
        }

        let found = self.lookup(&record.domain);
        EnrichmentRecord {
            domain: record.domain,
            company: Some(found.company),
            category: Some(found.category),
        }
    }
}

/// 去掉协议、所有 `www.` 以及第一个 `/` 之后的内容
pub fn clean_domain(domain: &str) -> String {
    let stripped = domain
        .trim()
        .to_lowercase()
        .replace("https://", "")
        .replace("http://", "")
        .replace("www.", "");
    stripped
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 由公司名关键字推断分类
pub fn category_for_company(company: &str) -> &'static str {
    let lower = company.to_lowercase();
    CATEGORY_BUCKETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}
