//! Run configuration loaded from YAML.
//!
//! Every key is optional. Whatever a configuration file leaves out falls
//! back to the built-in defaults, including individual sites inside
//! `site_urls` and `crawl.download_delay_secs`.
//!
//! ```yaml
//! run_spiders: [bbc, ap, reuters]
//! site_urls:
//!   bbc:
//!     - https://www.bbc.com/news/business
//!   generic:
//!     - https://example.com/news/some-story
//! generic:
//!   headline_selector: "h1"
//!   body_selector: "article p"
//! crawl:
//!   concurrency: 8
//!   timeout_secs: 30
//!   download_delay_secs:
//!     reuters: 2.0
//! ```

use crate::error::{Error, Result};
use crate::scrapers::SiteId;
use crate::scrapers::profile::{DEFAULT_BODY_SELECTOR, DEFAULT_HEADLINE_SELECTOR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

const AP_SEEDS: &[&str] = &["https://apnews.com/hub/business"];

const BBC_SEEDS: &[&str] = &[
    "https://www.bbc.com/news/business",
    "https://www.bbc.com/news/world",
];

const REUTERS_SEEDS: &[&str] = &[
    "https://www.reuters.com/world/africa/",
    "https://www.reuters.com/world/americas/",
    "https://www.reuters.com/world/asia-pacific/",
    "https://www.reuters.com/world/china/",
    "https://www.reuters.com/world/europe/",
    "https://www.reuters.com/world/india/",
    "https://www.reuters.com/world/middle-east/",
    "https://www.reuters.com/world/uk/",
    "https://www.reuters.com/world/us/",
    "https://www.reuters.com/world/reuters-next/",
    "https://www.reuters.com/legal/",
    "https://www.reuters.com/business/finance/",
    "https://www.reuters.com/business/aerospace-defense/",
    "https://www.reuters.com/business/energy/",
    "https://www.reuters.com/business/environment/",
    "https://www.reuters.com/business/healthcare-pharmaceuticals/",
    "https://www.reuters.com/business/media-telecom/",
    "https://www.reuters.com/business/retail-consumer/",
    "https://www.reuters.com/business/sustainable-business/",
];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Sites crawled when `--sites` is not given.
    pub run_spiders: Vec<SiteId>,
    /// Seed URLs per site.
    pub site_urls: BTreeMap<SiteId, Vec<String>>,
    /// Selectors of the generic profile.
    pub generic: GenericSelectors,
    pub crawl: CrawlConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenericSelectors {
    pub headline_selector: String,
    pub body_selector: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Pages of one site fetched at the same time.
    pub concurrency: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Mean gap between the starts of two fetches of the same site.
    pub download_delay_secs: BTreeMap<SiteId, f64>,
}

impl Default for Config {
    fn default() -> Self {
        let site_urls = [
            (SiteId::Ap, AP_SEEDS),
            (SiteId::Bbc, BBC_SEEDS),
            (SiteId::Reuters, REUTERS_SEEDS),
            (SiteId::Generic, &[][..]),
        ]
        .into_iter()
        .map(|(site, urls)| (site, urls.iter().map(|u| u.to_string()).collect()))
        .collect();

        Self {
            run_spiders: vec![SiteId::Bbc, SiteId::Ap, SiteId::Reuters],
            site_urls,
            generic: GenericSelectors::default(),
            crawl: CrawlConfig::default(),
        }
    }
}

impl Default for GenericSelectors {
    fn default() -> Self {
        Self {
            headline_selector: DEFAULT_HEADLINE_SELECTOR.to_string(),
            body_selector: DEFAULT_BODY_SELECTOR.to_string(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            download_delay_secs: BTreeMap::from([(SiteId::Reuters, 2.0)]),
        }
    }
}

impl Config {
    /// Load the configuration at `path`, or the defaults when no path is
    /// given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                let config = Self::from_yaml(&yaml)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => {
                info!("No configuration file given; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a YAML document and fill in whatever it leaves out.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Config = serde_yaml::from_str(yaml)?;
        let defaults = Config::default();

        for (site, urls) in defaults.site_urls {
            config.site_urls.entry(site).or_insert(urls);
        }
        for (site, delay) in defaults.crawl.download_delay_secs {
            config.crawl.download_delay_secs.entry(site).or_insert(delay);
        }
        for (site, secs) in &config.crawl.download_delay_secs {
            Duration::try_from_secs_f64(*secs).map_err(|e| Error::InvalidConfig {
                key: format!("crawl.download_delay_secs.{site}"),
                reason: e.to_string(),
            })?;
        }
        Ok(config)
    }

    /// Seed URLs for `site`, empty if none are configured.
    pub fn seed_urls(&self, site: SiteId) -> Vec<String> {
        self.site_urls.get(&site).cloned().unwrap_or_default()
    }

    /// Mean download delay for `site`.
    pub fn download_delay(&self, site: SiteId) -> Duration {
        self.crawl
            .download_delay_secs
            .get(&site)
            .and_then(|secs| Duration::try_from_secs_f64(*secs).ok())
            .unwrap_or(Duration::ZERO)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl.timeout_secs)
    }
}
