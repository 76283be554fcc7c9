//! Headline and body extraction for article pages.

use crate::models::{ArticleRecord, Page};
use crate::scrapers::profile::SiteProfile;
use scraper::{ElementRef, Html};
use thiserror::Error;

/// An article page whose headline or body came out empty.
///
/// This is an expected outcome on pages that are not really articles
/// (live blogs, video pages, paywalls). The page is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient text scraped (headline empty: {headline_empty}, body empty: {body_empty})")]
pub struct Incomplete {
    pub headline_empty: bool,
    pub body_empty: bool,
}

/// Extract an [`ArticleRecord`] from `page` using the profile's selectors.
///
/// The headline is the text of the first element matching
/// `headline_query`. The body is the text of every element matching
/// `body_query`, in document order. Text fragments are trimmed and joined
/// with single spaces.
pub fn extract_article(page: &Page, profile: &SiteProfile) -> Result<ArticleRecord, Incomplete> {
    let document = Html::parse_document(&page.html);

    let headline = document
        .select(&profile.headline_query)
        .next()
        .map(|el| join_fragments(std::iter::once(el)))
        .unwrap_or_default();
    let body = join_fragments(document.select(&profile.body_query));

    if headline.is_empty() || body.is_empty() {
        return Err(Incomplete {
            headline_empty: headline.is_empty(),
            body_empty: body.is_empty(),
        });
    }

    Ok(ArticleRecord::new(&headline, &body, page.url.as_str()))
}

fn join_fragments<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .flat_map(|el| el.text())
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
