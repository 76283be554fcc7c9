//! Combine the per-site output files of a run into one table.
//!
//! Every `*.csv` file directly inside the input directory is read in file
//! name order and its rows are copied verbatim, under a single `text,url`
//! header, into the combined file. The combined file itself is skipped
//! when it lives in the same directory.

use crate::error::{Error, Result};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

const HEADER: [&str; 2] = ["text", "url"];

/// List the CSV inputs of `input_dir`, sorted by file name, leaving out
/// `exclude`.
async fn list_inputs(input_dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    let mut entries = match fs::read_dir(input_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(inputs),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_csv = path.extension().is_some_and(|ext| ext == "csv");
        if !is_csv || !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(exclude) = exclude {
            if fs::canonicalize(&path).await.ok().as_deref() == Some(exclude) {
                debug!(path = %path.display(), "Skipping merge target");
                continue;
            }
        }
        inputs.push(path);
    }
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

/// Merge the per-site CSV files in `input_dir` into `output`.
///
/// # Returns
///
/// The number of data rows written.
///
/// # Errors
///
/// - [`Error::NoInputFiles`] if `input_dir` holds no CSV files
/// - [`Error::MalformedRow`] if an input row does not have exactly two fields
/// - [`Error::Io`] / [`Error::Csv`] on read or write failures
#[instrument(level = "info", skip_all, fields(input_dir = %input_dir.as_ref().display(), output = %output.as_ref().display()))]
pub async fn combine_csv(input_dir: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize> {
    let input_dir = input_dir.as_ref();
    let output = output.as_ref();

    let exclude = fs::canonicalize(output).await.ok();
    let inputs = list_inputs(input_dir, exclude.as_deref()).await?;
    if inputs.is_empty() {
        return Err(Error::NoInputFiles {
            dir: input_dir.to_path_buf(),
        });
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    let mut rows = 0usize;
    for path in &inputs {
        let bytes = fs::read(path).await?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut file_rows = 0usize;
        for result in reader.records() {
            let record = result?;
            if record.len() != HEADER.len() {
                return Err(Error::MalformedRow {
                    path: path.clone(),
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    fields: record.len(),
                });
            }
            writer.write_record(&record)?;
            file_rows += 1;
        }
        debug!(path = %path.display(), rows = file_rows, "Merged file");
        rows += file_rows;
    }

    let combined = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    fs::write(output, combined).await?;
    info!(files = inputs.len(), rows, "Combined CSV files");
    Ok(rows)
}
