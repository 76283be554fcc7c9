//! # News Scrape
//!
//! Crawls the section pages of a few news sites, extracts the headline and
//! body text of every article they link to, and collects the results in
//! CSV tables.
//!
//! ## Features
//!
//! - Built-in profiles for AP News, BBC News and Reuters, plus a generic
//!   profile for operator-supplied article URLs
//! - One append-only CSV file per site and day (`text`, `url` columns)
//! - A combined `raw_news.csv` with a header row at the end of each run
//! - YAML configuration for seed URLs, generic selectors and crawl pacing
//!
//! ## Usage
//!
//! ```sh
//! news_scrape -c config.yml -o raw_scrapes --log-dir logs
//! ```
//!
//! ## Architecture
//!
//! The application runs as a pipeline:
//! 1. **Classification**: fetch each section page and keep the links that look like articles
//! 2. **Extraction**: fetch each article and reduce it to headline + body
//! 3. **Sink**: append every complete article to the site's CSV file as it arrives
//! 4. **Merge**: combine all per-site files into one table

use chrono::Local;
use clap::Parser;
use futures::future::join_all;
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::Config;
use crawler::crawl_site;
use fetch::HttpFetcher;
use outputs::merge::combine_csv;
use outputs::sink::date_stamp;
use utils::ensure_writable_dir;

/// Install the tracing subscriber, writing to `<log_dir>/<date>.log` when a
/// log directory is given and to stderr otherwise.
fn init_tracing(log_dir: Option<&Path>, stamp: &str) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file = File::create(dir.join(format!("{stamp}.log")))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let run_date = Local::now().date_naive();
    init_tracing(args.log_dir.as_deref(), &date_stamp(run_date))?;

    let start_time = std::time::Instant::now();
    info!("news_scrape starting up");
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref()).await?;
    let combined_path = args.combined_path();

    if !args.merge_only {
        if let Err(e) = ensure_writable_dir(&args.output_dir).await {
            error!(
                path = %args.output_dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }

        let sites = if args.sites.is_empty() {
            config.run_spiders.clone()
        } else {
            args.sites.clone()
        };
        let fetcher = HttpFetcher::new(&config.crawl.user_agent, config.request_timeout())?;

        info!(sites = ?sites, "=========== BEGINNING SCRAPE ===========");
        let results = join_all(sites.iter().map(|site| {
            crawl_site(
                *site,
                &config,
                fetcher.clone(),
                &args.output_dir,
                run_date,
            )
        }))
        .await;

        let mut total_written = 0;
        for (site, result) in sites.iter().zip(results) {
            match result {
                Ok(summary) => {
                    total_written += summary.records_written;
                    info!(%site, written = summary.records_written, skipped = summary.pages_skipped, "Site finished");
                }
                Err(e) => error!(%site, error = %e, "Site crawl could not start"),
            }
        }
        info!(total_written, "=========== SCRAPE COMPLETE ===========");
    }

    if args.skip_merge {
        warn!("Skipping merge of per-site files");
    } else {
        info!("Combining csv files ...");
        let rows = combine_csv(&args.output_dir, &combined_path).await?;
        info!(rows, path = %combined_path.display(), "Raw csv files combined");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
