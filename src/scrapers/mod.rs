//! Site profiles and the page parsers that use them.
//!
//! Scraping is a two-phase process for every source:
//!
//! 1. **Classification**: a section page is searched for links whose URL
//!    matches the site's article pattern ([`links::article_links`])
//! 2. **Extraction**: each article page is reduced to a headline and a body
//!    using the site's selectors ([`article::extract_article`])
//!
//! # Supported Sources
//!
//! | Source | Id | Article links | Body |
//! |--------|----|---------------|------|
//! | AP News | `ap` | `article/<words>-<15+ chars>` | `div` whose class contains `Article` |
//! | BBC News | `bbc` | `<words>-<digits>` | `data-component="text-block"` in the first `article` |
//! | Reuters | `reuters` | `<words>-YYYY-MM-DD` | `div` whose class contains `ArticleBody__content` |
//! | Generic | `generic` | none, seeds are articles | configurable |
//!
//! Both parsers are pure functions of the page and the profile, so any
//! number of pages of the same site can be parsed concurrently.

pub mod article;
pub mod links;
pub mod profile;

pub use article::{Incomplete, extract_article};
pub use links::{article_links, resolve_links};
pub use profile::{SiteId, SiteProfile, profile_for};
