//! Command-line interface definitions for News Scrape.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Everything that describes *what* to crawl (sites, seed URLs, selectors,
//! crawl pacing) lives in the YAML configuration; the command line chooses
//! where output goes and which steps run.

use crate::scrapers::SiteId;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Scrape application.
///
/// # Examples
///
/// ```sh
/// # Crawl the configured sites and merge into raw_scrapes/raw_news.csv
/// news_scrape
///
/// # Crawl BBC only with a custom configuration, logging to a file
/// news_scrape -c config.yml --sites bbc --log-dir logs
///
/// # Only rebuild the combined file
/// news_scrape --merge-only -o raw_scrapes
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the per-site CSV files
    #[arg(short, long, default_value = "raw_scrapes")]
    pub output_dir: PathBuf,

    /// Path of the combined CSV file [default: <output-dir>/raw_news.csv]
    #[arg(long)]
    pub combined_file: Option<PathBuf>,

    /// Sites to crawl, overriding `run_spiders` from the configuration
    #[arg(long, value_enum, value_delimiter = ',', ignore_case = true)]
    pub sites: Vec<SiteId>,

    /// Write the log to <log-dir>/<DDMonYYYY>.log instead of stderr
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Crawl without merging the per-site files afterwards
    #[arg(long, conflicts_with = "merge_only")]
    pub skip_merge: bool,

    /// Merge existing per-site files without crawling
    #[arg(long)]
    pub merge_only: bool,
}

impl Cli {
    /// Where the combined table is written.
    pub fn combined_path(&self) -> PathBuf {
        self.combined_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("raw_news.csv"))
    }
}
