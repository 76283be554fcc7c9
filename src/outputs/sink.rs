//! Per-site append-only CSV output.
//!
//! Each site writes to its own file for the day, named after the site and
//! the run date:
//!
//! ```text
//! raw_scrapes/
//! ├── ap_raw_17Oct2026.csv
//! ├── bbc_raw_17Oct2026.csv
//! └── reuters_raw_17Oct2026.csv
//! ```
//!
//! Files have two columns (`text`, `url`), no header, minimal quoting and
//! `\n` line endings. A rerun on the same day appends to the same file.

use crate::error::{Error, Result};
use crate::models::ArticleRecord;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Date stamp used in output and log file names, e.g. `17Oct2026`.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%d%b%Y").to_string()
}

/// File name of a site's output for `date`.
pub fn sink_file_name(site: &str, date: NaiveDate) -> String {
    format!("{}_raw_{}.csv", site, date_stamp(date))
}

/// Encode one record as a complete CSV row, terminator included.
pub fn encode_row(record: &ArticleRecord) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.serialize(record)?;
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Append-only CSV file for one site.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Open (creating if needed) the output file at `path`.
    ///
    /// Existing rows are kept; new rows are appended after them.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        info!("Output file ready");
        Ok(Self { path })
    }

    /// Open the output file of `site` for `date` inside `dir`.
    pub async fn for_site(dir: impl AsRef<Path>, site: &str, date: NaiveDate) -> Result<Self> {
        Self::create(dir.as_ref().join(sink_file_name(site, date))).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single write.
    ///
    /// The row is encoded in memory first so a reader never sees half of
    /// it. Concurrent appends to the same file are not ordered.
    pub async fn append(&self, record: &ArticleRecord) -> Result<()> {
        let row = encode_row(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&row).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), url = %record.url, bytes = row.len(), "Appended record");
        Ok(())
    }
}
