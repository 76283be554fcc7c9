//! The crawl driver.
//!
//! A crawl is a sequence of explicit tasks. A [`CrawlTask::Section`] task
//! fetches a listing page and classifies its links, producing
//! [`CrawlTask::Article`] follow-ups. An article task fetches a page and
//! extracts at most one [`ArticleRecord`], which is appended to the site's
//! sink straight away.
//!
//! Tasks are processed in waves: every task of the current frontier runs
//! with bounded concurrency, and the follow-ups they return form the next
//! frontier. Per-page problems (failed fetches, pages with too little
//! text, failed writes) are logged and counted but never stop the crawl.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, Page};
use crate::outputs::sink::CsvSink;
use crate::scrapers::{
    Incomplete, SiteId, SiteProfile, article_links, extract_article, profile_for, resolve_links,
};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, instrument, warn};

/// One unit of crawl work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTask {
    /// A listing page whose article links should be followed.
    Section(String),
    /// An article page to extract.
    Article(String),
}

impl CrawlTask {
    pub fn url(&self) -> &str {
        match self {
            CrawlTask::Section(url) | CrawlTask::Article(url) => url,
        }
    }
}

/// Result of running a single [`CrawlTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A section page was parsed; these article tasks follow from it.
    Followed(Vec<CrawlTask>),
    /// An article page produced a record.
    Extracted(ArticleRecord),
    /// An article page had an empty headline or body.
    Skipped(Incomplete),
    /// The page could not be fetched.
    FetchFailed,
}

/// Scheduling knobs for one site's crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSettings {
    /// Maximum number of tasks in flight.
    pub concurrency: usize,
    /// Mean gap between the start of consecutive fetches of the site; the
    /// actual gap is randomized between half and one and a half times this
    /// value. Applies across all in-flight tasks.
    pub download_delay: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            download_delay: Duration::ZERO,
        }
    }
}

/// Counters reported at the end of a site's crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub sections_fetched: usize,
    pub links_followed: usize,
    pub records_written: usize,
    pub pages_skipped: usize,
    pub fetch_failures: usize,
    pub write_failures: usize,
}

/// Crawls one site with one profile, writing to one sink.
#[derive(Debug)]
pub struct SiteCrawler<F> {
    profile: SiteProfile,
    fetcher: F,
    sink: CsvSink,
    settings: CrawlSettings,
    /// Earliest time the next fetch may start.
    next_fetch: Mutex<Instant>,
}

impl<F: Fetcher> SiteCrawler<F> {
    pub fn new(profile: SiteProfile, fetcher: F, sink: CsvSink, settings: CrawlSettings) -> Self {
        Self {
            profile,
            fetcher,
            sink,
            settings,
            next_fetch: Mutex::new(Instant::now()),
        }
    }

    /// Initial tasks: seeds are section pages, or article pages when the
    /// profile has no article pattern.
    pub fn seed_tasks(&self) -> Vec<CrawlTask> {
        self.profile
            .seed_urls
            .iter()
            .map(|url| {
                if self.profile.classifies_links() {
                    CrawlTask::Section(url.clone())
                } else {
                    CrawlTask::Article(url.clone())
                }
            })
            .collect()
    }

    /// Fetch the task's page and parse it.
    pub async fn step(&self, task: &CrawlTask) -> StepOutcome {
        self.pause().await;

        let page = match self.fetcher.fetch(task.url()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(site = %self.profile.name, url = %task.url(), error = %e, "Fetch failed; skipping page");
                return StepOutcome::FetchFailed;
            }
        };

        match (task, &self.profile.article_pattern) {
            (CrawlTask::Section(_), Some(pattern)) => {
                let hrefs = article_links(&page, pattern);
                let follow = resolve_links(&page.url, &hrefs)
                    .into_iter()
                    .map(CrawlTask::Article)
                    .collect::<Vec<_>>();
                debug!(site = %self.profile.name, url = %page.url, count = follow.len(), "Classified section page");
                StepOutcome::Followed(follow)
            }
            _ => self.extract(&page),
        }
    }

    fn extract(&self, page: &Page) -> StepOutcome {
        match extract_article(page, &self.profile) {
            Ok(record) => {
                debug!(site = %self.profile.name, url = %page.url, preview = %truncate_for_log(&record.text, 80), "Extracted article");
                StepOutcome::Extracted(record)
            }
            Err(incomplete) => {
                info!(site = %self.profile.name, url = %page.url, %incomplete, "Insufficient text scraped");
                StepOutcome::Skipped(incomplete)
            }
        }
    }

    /// Wait for this site's next fetch slot and reserve the one after it.
    ///
    /// The lock is held while sleeping, so concurrent tasks queue up and
    /// start their fetches one gap apart.
    async fn pause(&self) {
        let delay = self.settings.download_delay;
        if delay.is_zero() {
            return;
        }
        let mut next_fetch = self.next_fetch.lock().await;
        sleep_until(*next_fetch).await;

        let factor: f64 = rng().random_range(0.5..1.5);
        let gap = Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(delay);
        let now = Instant::now();
        *next_fetch = now.checked_add(gap).unwrap_or(now);
    }

    async fn write(&self, record: &ArticleRecord) -> bool {
        match self.sink.append(record).await {
            Ok(()) => true,
            Err(e) => {
                error!(site = %self.profile.name, url = %record.url, path = %self.sink.path().display(), error = %e, "Failed to append record");
                false
            }
        }
    }

    /// Run the crawl until no tasks remain.
    #[instrument(level = "info", skip_all, fields(site = %self.profile.name))]
    pub async fn run(&self) -> CrawlSummary {
        let concurrency = self.settings.concurrency.max(1);
        let mut summary = CrawlSummary::default();
        let mut frontier = self.seed_tasks();
        info!(seeds = frontier.len(), concurrency, "Starting crawl");

        while !frontier.is_empty() {
            let results: Vec<(StepOutcome, bool)> = stream::iter(std::mem::take(&mut frontier))
                .map(|task| async move {
                    let outcome = self.step(&task).await;
                    let written = match &outcome {
                        StepOutcome::Extracted(record) => self.write(record).await,
                        _ => false,
                    };
                    (outcome, written)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

            for (outcome, written) in results {
                match outcome {
                    StepOutcome::Followed(tasks) => {
                        summary.sections_fetched += 1;
                        summary.links_followed += tasks.len();
                        frontier.extend(tasks);
                    }
                    StepOutcome::Extracted(_) if written => summary.records_written += 1,
                    StepOutcome::Extracted(_) => summary.write_failures += 1,
                    StepOutcome::Skipped(_) => summary.pages_skipped += 1,
                    StepOutcome::FetchFailed => summary.fetch_failures += 1,
                }
            }
        }

        info!(
            sections = summary.sections_fetched,
            links = summary.links_followed,
            written = summary.records_written,
            skipped = summary.pages_skipped,
            fetch_failures = summary.fetch_failures,
            write_failures = summary.write_failures,
            "Crawl complete"
        );
        summary
    }
}

/// Crawl `site` as configured, appending to its dated file in `output_dir`.
pub async fn crawl_site<F: Fetcher>(
    site: SiteId,
    config: &Config,
    fetcher: F,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<CrawlSummary> {
    let profile = profile_for(site, config)?;
    let sink = CsvSink::for_site(output_dir, site.as_str(), date).await?;
    let settings = CrawlSettings {
        concurrency: config.crawl.concurrency,
        download_delay: config.download_delay(site),
    };
    Ok(SiteCrawler::new(profile, fetcher, sink, settings).run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: StdMutex<Vec<(String, Instant)>>,
    }

    impl StaticFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
        }

        fn fetch_times(&self) -> Vec<Instant> {
            self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
        }
    }

    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Page> {
            self.requests.lock().unwrap().push((url.to_string(), Instant::now()));
            match self.pages.get(url) {
                Some(html) => Ok(Page::new(url, html.as_str())),
                None => Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    url.to_string(),
                ))),
            }
        }
    }

    const SECTION: &str = "https://www.bbc.com/news/business";

    fn article(headline: &str, paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<div data-component="text-block"><p>{p}</p></div>"#))
            .collect();
        format!(r#"<html><body><h1 id="main-heading">{headline}</h1><article>{body}</article></body></html>"#)
    }

    fn bbc_profile(seeds: &[&str]) -> SiteProfile {
        let mut profile = profile_for(SiteId::Bbc, &Config::default()).unwrap();
        profile.seed_urls = seeds.iter().map(|s| s.to_string()).collect();
        profile
    }

    async fn crawler<F: Fetcher>(
        dir: &Path,
        profile: SiteProfile,
        fetcher: F,
    ) -> SiteCrawler<F> {
        let sink = CsvSink::create(dir.join("site_raw.csv")).await.unwrap();
        SiteCrawler::new(profile, fetcher, sink, CrawlSettings::default())
    }

    async fn written_rows(dir: &Path) -> Vec<String> {
        let contents = tokio::fs::read_to_string(dir.join("site_raw.csv")).await.unwrap();
        let mut rows: Vec<String> = contents.lines().map(str::to_string).collect();
        rows.sort();
        rows
    }

    #[tokio::test]
    async fn test_section_step_returns_resolved_article_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default().with_page(
            SECTION,
            r#"<a href="/news/business-111">a</a><a href="/news/world">b</a>"#,
        );
        let crawler = crawler(dir.path(), bbc_profile(&[SECTION]), fetcher).await;

        let outcome = crawler.step(&CrawlTask::Section(SECTION.to_string())).await;
        assert_eq!(
            outcome,
            StepOutcome::Followed(vec![CrawlTask::Article(
                "https://www.bbc.com/news/business-111".to_string()
            )])
        );
    }

    #[tokio::test]
    async fn test_section_without_article_links_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default().with_page(SECTION, "<a href=\"/news/world\">w</a>");
        let crawler = crawler(dir.path(), bbc_profile(&[SECTION]), fetcher).await;

        let summary = crawler.run().await;
        assert_eq!(
            summary,
            CrawlSummary {
                sections_fetched: 1,
                ..CrawlSummary::default()
            }
        );
        assert!(written_rows(dir.path()).await.is_empty());
    }

    #[tokio::test]
    async fn test_full_crawl_writes_complete_articles_only() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::default()
            .with_page(
                SECTION,
                r#"<a href="/news/business-1">one</a>
                   <a href="/news/business-2">two</a>
                   <a href="/news/business-3">missing</a>
                   <a href="/news/business-1">one again</a>
                   <a href="/news/live">live</a>"#,
            )
            .with_page(
                "https://www.bbc.com/news/business-1",
                &article("Markets Rally", &["Stocks rose.", "Bonds fell."]),
            )
            .with_page(
                "https://www.bbc.com/news/business-2",
                &article("No body", &[]),
            );
        let crawler = crawler(dir.path(), bbc_profile(&[SECTION]), fetcher).await;

        let summary = crawler.run().await;

        assert_eq!(
            summary,
            CrawlSummary {
                sections_fetched: 1,
                links_followed: 4,
                records_written: 2,
                pages_skipped: 1,
                fetch_failures: 1,
                write_failures: 0,
            }
        );
        let row = "Markets Rally Stocks rose. Bonds fell.,https://www.bbc.com/news/business-1";
        assert_eq!(written_rows(dir.path()).await, vec![row.to_string(), row.to_string()]);
    }

    #[tokio::test]
    async fn test_failed_seed_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        let crawler = crawler(dir.path(), bbc_profile(&[SECTION]), StaticFetcher::default()).await;

        let summary = crawler.run().await;
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.sections_fetched, 0);
    }

    #[tokio::test]
    async fn test_generic_seeds_are_articles() {
        let dir = tempfile::tempdir().unwrap();
        let story = "https://example.com/story";
        let fetcher = StaticFetcher::default().with_page(
            story,
            r#"<h1>Local</h1><article><p>Text.</p><a href="/news/business-1">x</a></article>"#,
        );
        let mut profile = profile_for(SiteId::Generic, &Config::default()).unwrap();
        profile.seed_urls = vec![story.to_string()];
        let crawler = crawler(dir.path(), profile, fetcher).await;

        assert_eq!(crawler.seed_tasks(), vec![CrawlTask::Article(story.to_string())]);
        let summary = crawler.run().await;

        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.sections_fetched, 0);
        assert_eq!(crawler.fetcher.requests(), vec![story.to_string()]);
        assert_eq!(
            written_rows(dir.path()).await,
            vec!["Local Text.,https://example.com/story".to_string()]
        );
    }

    #[tokio::test]
    async fn test_crawl_site_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let story = "https://example.com/story";
        let fetcher = StaticFetcher::default()
            .with_page(story, "<h1>Title</h1><article><p>Body.</p></article>");
        let config = Config::from_yaml(&format!("site_urls:\n  generic:\n    - {story}\n")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        let summary = crawl_site(SiteId::Generic, &config, fetcher, dir.path(), date)
            .await
            .unwrap();

        assert_eq!(summary.records_written, 1);
        let contents = tokio::fs::read_to_string(dir.path().join("generic_raw_17Oct2026.csv"))
            .await
            .unwrap();
        assert_eq!(contents, "Title Body.,https://example.com/story\n");
    }

    #[tokio::test]
    async fn test_download_delay_spaces_concurrent_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let seeds: Vec<String> = (0..4).map(|i| format!("https://example.com/story-{i}")).collect();
        let fetcher = seeds.iter().fold(StaticFetcher::default(), |fetcher, url| {
            fetcher.with_page(url, "<h1>Title</h1><article><p>Body.</p></article>")
        });
        let mut profile = profile_for(SiteId::Generic, &Config::default()).unwrap();
        profile.seed_urls = seeds.clone();
        let sink = CsvSink::create(dir.path().join("site_raw.csv")).await.unwrap();
        let settings = CrawlSettings {
            concurrency: 4,
            download_delay: Duration::from_millis(100),
        };
        let crawler = SiteCrawler::new(profile, fetcher, sink, settings);

        let summary = crawler.run().await;

        assert_eq!(summary.records_written, 4);
        let mut times = crawler.fetcher.fetch_times();
        times.sort();
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(45), "fetches only {gap:?} apart");
        }
    }
}
