//! Data models passed between the fetch, parse and output stages.
//!
//! - [`Page`]: a fetched document, consumed by exactly one parse step
//! - [`ArticleRecord`]: one extracted article, written as one CSV row

use serde::{Deserialize, Serialize};

/// A fetched HTML document.
///
/// Pages are transient: they are handed to either the link classifier or
/// the article extractor and then dropped. Nothing about a page is
/// persisted except the [`ArticleRecord`] that may be extracted from it.
#[derive(Debug, Clone)]
pub struct Page {
    /// The final URL of the page, after any redirects.
    pub url: String,
    /// The raw HTML body.
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// A scraped article as it is written to the per-site output file.
///
/// The field order matches the column order of the CSV tables: `text`
/// first, then `url`. Both fields are non-empty for every record the
/// extractor produces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Headline and body text joined by a single space.
    pub text: String,
    /// The URL the article was scraped from.
    pub url: String,
}

impl ArticleRecord {
    /// Build a record from a headline and a body.
    pub fn new(headline: &str, body: &str, url: impl Into<String>) -> Self {
        Self {
            text: format!("{headline} {body}"),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_record_joins_headline_and_body() {
        let record = ArticleRecord::new("Markets Rally", "Stocks rose.", "https://example.com/a");
        assert_eq!(record.text, "Markets Rally Stocks rose.");
        assert_eq!(record.url, "https://example.com/a");
    }

    #[test]
    fn test_page_creation() {
        let page = Page::new("https://example.com", "<html></html>");
        assert_eq!(page.url, "https://example.com");
        assert_eq!(page.html, "<html></html>");
    }
}
