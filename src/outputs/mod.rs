//! Output files: per-site CSV sinks and the end-of-run merge.
//!
//! # Submodules
//!
//! - [`sink`]: appends extracted records to one CSV file per site and day
//! - [`merge`]: combines every per-site file into a single table with a header
//!
//! # Output Structure
//!
//! ```text
//! raw_scrapes/
//! ├── ap_raw_17Oct2026.csv       # text,url rows, no header
//! ├── bbc_raw_17Oct2026.csv
//! ├── reuters_raw_17Oct2026.csv
//! └── raw_news.csv               # "text,url" header + all rows
//! ```

pub mod merge;
pub mod sink;
