//! Article link classification for section pages.
//!
//! A section page lists many links: navigation, other sections, video
//! pages, and the articles themselves. Each site's article URLs share a
//! recognisable slug shape, so the classifier keeps every `href` in which
//! the site's pattern is found anywhere in the string.

use crate::models::Page;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static anchor selector"));

/// Return the `href` values on `page` that match `pattern`.
///
/// Links are returned raw, in document order, duplicates included. A page
/// with no matching links yields an empty vector.
pub fn article_links(page: &Page, pattern: &Regex) -> Vec<String> {
    let document = Html::parse_document(&page.html);
    let links: Vec<String> = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| pattern.is_match(href))
        .map(str::to_string)
        .collect();

    if links.is_empty() {
        debug!(url = %page.url, "No article links on section page");
    }
    links
}

/// Resolve raw hrefs against the page they were found on.
///
/// Hrefs that cannot be turned into an absolute URL are dropped.
pub fn resolve_links(page_url: &str, hrefs: &[String]) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(base) => Some(base),
        Err(e) => {
            debug!(url = %page_url, error = %e, "Section URL is not absolute; keeping absolute links only");
            None
        }
    };

    hrefs
        .iter()
        .filter_map(|href| {
            let resolved = match &base {
                Some(base) => base.join(href),
                None => Url::parse(href),
            };
            match resolved {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    debug!(%href, error = %e, "Dropping unresolvable link");
                    None
                }
            }
        })
        .collect()
}
