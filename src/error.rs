//! Error types shared by the configuration, fetch, output and merge layers.
//!
//! Per-page problems (an article with an empty headline, a listing page
//! without article links) are not errors here; they are ordinary outcomes
//! handled where they occur. Only set-up failures and the merge step
//! surface an [`Error`] to the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration value `{key}`: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Invalid article pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("No input files found in {}", dir.display())]
    NoInputFiles { dir: PathBuf },

    #[error("{}:{line}: expected 2 fields, found {fields}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        fields: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
