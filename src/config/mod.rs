//! Configuration for wikigraph

mod archive;
mod crawl;
mod logging;

pub use archive::ArchiveConfig;
pub use crawl::CrawlConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Top-level configuration, read from `wikigraph.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dump, index and URL settings
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Crawl limits and outputs
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.archive.archive_path.as_os_str().is_empty() {
            errors.push("archive.archive_path must not be empty".to_string());
        }
        if self.archive.index_path.as_os_str().is_empty() {
            errors.push("archive.index_path must not be empty".to_string());
        }
        if self.archive.persisted_index_path.as_os_str().is_empty() {
            errors.push("archive.persisted_index_path must not be empty".to_string());
        }
        match Url::parse(&self.archive.base_url) {
            Ok(url) if url.cannot_be_a_base() => {
                errors.push(format!(
                    "archive.base_url '{}' cannot be used as a base URL",
                    self.archive.base_url
                ));
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(format!(
                    "archive.base_url '{}' is not a valid URL: {}",
                    self.archive.base_url, e
                ));
            }
        }

        if self.crawl.max_articles == 0 {
            errors.push("crawl.max_articles must be positive".to_string());
        }
        if self.crawl.cache_flush_interval == 0 {
            errors.push("crawl.cache_flush_interval must be positive".to_string());
        }
        if self.crawl.cache_path.as_os_str().is_empty() {
            errors.push("crawl.cache_path must not be empty".to_string());
        }
        if self.crawl.graph_path.as_os_str().is_empty() {
            errors.push("crawl.graph_path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
