use anyhow::{Context, Result};
use serde::Deserialize;
use sift_indexer::{CrawlerConfig, DEFAULT_TEXT_EXTENSIONS};
use std::path::Path;
use std::time::Duration;

/// Optional `--config` file. Every key may be omitted.
///
/// ```toml
/// threads = 8
///
/// [crawler]
/// max_links = 50
/// connect_timeout_secs = 5
/// read_timeout_secs = 10
/// max_response_bytes = 10485760
///
/// [indexer]
/// extensions = ["txt", "text"]
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub threads: Option<i64>,
    pub crawler: CrawlerSection,
    pub indexer: IndexerSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerSection {
    pub max_links: Option<usize>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub max_response_bytes: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerSection {
    pub extensions: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    #[must_use]
    pub fn crawler_config(&self) -> CrawlerConfig {
        let defaults = CrawlerConfig::default();
        let section = &self.crawler;
        CrawlerConfig {
            max_links: section.max_links.unwrap_or(defaults.max_links),
            connect_timeout: section
                .connect_timeout_secs
                .map_or(defaults.connect_timeout, Duration::from_secs),
            read_timeout: section
                .read_timeout_secs
                .map_or(defaults.read_timeout, Duration::from_secs),
            max_response_bytes: section
                .max_response_bytes
                .unwrap_or(defaults.max_response_bytes),
            user_agent: section.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        match &self.indexer.extensions {
            Some(extensions) => extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            None => DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}
