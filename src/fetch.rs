//! Page fetching.
//!
//! The crawl driver only needs one capability from the network layer:
//! turn a URL into a [`Page`]. That capability is the [`Fetcher`] trait, so
//! the driver can run against real HTTP ([`HttpFetcher`]) or an in-memory
//! set of pages in tests.
//!
//! There is no retry policy here. A failed fetch is reported once and the
//! caller skips that URL.

use crate::error::{Error, Result};
use crate::models::Page;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Something that can fetch a page by URL.
pub trait Fetcher {
    /// Fetch `url` and return its body along with the final URL.
    async fn fetch(&self, url: &str) -> Result<Page>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher sending `user_agent` and giving up on requests that
    /// take longer than `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page> {
        let t0 = Instant::now();
        let res = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let final_url = response.url().to_string();
            let html = response.text().await?;
            Ok::<_, Error>(Page::new(final_url, html))
        }
        .await;
        let dt = t0.elapsed();

        match &res {
            Ok(page) => debug!(
                elapsed_ms = dt.as_millis() as u64,
                bytes = page.html.len(),
                "Fetched page"
            ),
            Err(e) => debug!(elapsed_ms = dt.as_millis() as u64, error = %e, "Fetch failed"),
        }
        res
    }
}
