//! Site profiles and the registry that builds them.
//!
//! Every supported source is described by the same [`SiteProfile`] shape:
//! a set of seed section URLs, a regular expression that recognises
//! article links on those sections, and the two CSS selectors that locate
//! the headline and the body paragraphs on an article page. There is one
//! crawl algorithm for all sites; only the profile differs.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::ValueEnum;
use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a supported news source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    /// AP News.
    Ap,
    /// BBC News.
    Bbc,
    /// Reuters.
    Reuters,
    /// Operator-defined source; seeds are article pages.
    #[serde(alias = "other")]
    Generic,
}

impl SiteId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteId::Ap => "ap",
            SiteId::Bbc => "bbc",
            SiteId::Reuters => "reuters",
            SiteId::Generic => "generic",
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article URL slug: hyphen-joined words followed by an id of at least
/// fifteen word characters.
pub const AP_ARTICLE_PATTERN: &str = r"article/(\w+-)+\w{15,}";
/// Hyphen-joined words followed by a numeric id.
pub const BBC_ARTICLE_PATTERN: &str = r"(\w+-)+\d+";
/// Hyphen-joined words followed by an ISO date.
pub const REUTERS_ARTICLE_PATTERN: &str = r"(\w+-)+\d{4}-\d{2}-\d{2}";

pub const DEFAULT_HEADLINE_SELECTOR: &str = "h1";
pub const DEFAULT_BODY_SELECTOR: &str = "article p";

/// How a site's pages are recognised and parsed.
///
/// Profiles are built once at start-up and shared read-only by every
/// in-flight page of the site's crawl.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Site identifier, also used in output file names.
    pub name: String,
    /// Section pages (or article pages, for profiles without a pattern)
    /// the crawl starts from, in order.
    pub seed_urls: Vec<String>,
    /// Pattern searched for in every link of a section page. `None` means
    /// the seeds are article pages and no classification happens.
    pub article_pattern: Option<Regex>,
    /// Selector whose first match is the headline.
    pub headline_query: Selector,
    /// Selector whose matches, in document order, make up the body.
    pub body_query: Selector,
}

impl SiteProfile {
    /// Build a profile, compiling its pattern and selectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] or [`Error::Selector`] if the pattern or
    /// one of the selectors does not parse.
    pub fn new(
        name: impl Into<String>,
        seed_urls: Vec<String>,
        article_pattern: Option<&str>,
        headline_query: &str,
        body_query: &str,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            seed_urls,
            article_pattern: article_pattern.map(Regex::new).transpose()?,
            headline_query: parse_selector(headline_query)?,
            body_query: parse_selector(body_query)?,
        })
    }

    /// Whether seed URLs are section pages that need link classification.
    pub fn classifies_links(&self) -> bool {
        self.article_pattern.is_some()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Build the profile for `site`, taking seed URLs (and, for the generic
/// profile, selectors) from the configuration.
pub fn profile_for(site: SiteId, config: &Config) -> Result<SiteProfile> {
    let seeds = config.seed_urls(site);
    match site {
        SiteId::Ap => SiteProfile::new(
            site.as_str(),
            seeds,
            Some(AP_ARTICLE_PATTERN),
            "h1",
            r#"div[class*="Article"] p"#,
        ),
        SiteId::Bbc => SiteProfile::new(
            site.as_str(),
            seeds,
            Some(BBC_ARTICLE_PATTERN),
            "h1#main-heading",
            r#"article:first-of-type div[data-component="text-block"] p"#,
        ),
        SiteId::Reuters => SiteProfile::new(
            site.as_str(),
            seeds,
            Some(REUTERS_ARTICLE_PATTERN),
            "h1",
            r#"div[class*="ArticleBody__content"] p"#,
        ),
        SiteId::Generic => SiteProfile::new(
            site.as_str(),
            seeds,
            None,
            &config.generic.headline_selector,
            &config.generic.body_selector,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_site_has_a_profile() {
        let config = Config::default();
        for site in SiteId::value_variants() {
            let site = *site;
            let profile = profile_for(site, &config).unwrap();
            assert_eq!(profile.name, site.as_str());
        }
    }

    #[test]
    fn test_generic_profile_has_no_pattern() {
        let profile = profile_for(SiteId::Generic, &Config::default()).unwrap();
        assert!(!profile.classifies_links());
        assert!(profile.seed_urls.is_empty());
    }

    #[test]
    fn test_named_profiles_classify_links() {
        let config = Config::default();
        for site in [SiteId::Ap, SiteId::Bbc, SiteId::Reuters] {
            assert!(profile_for(site, &config).unwrap().classifies_links());
        }
    }

    #[test]
    fn test_profile_uses_configured_seeds() {
        let config = Config::from_yaml(
            "site_urls:\n  bbc:\n    - https://www.bbc.com/news/science_and_environment\n",
        )
        .unwrap();
        let profile = profile_for(SiteId::Bbc, &config).unwrap();
        assert_eq!(
            profile.seed_urls,
            vec!["https://www.bbc.com/news/science_and_environment".to_string()]
        );
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let err = SiteProfile::new("x", vec![], None, "h1[", "p").unwrap_err();
        assert!(matches!(err, Error::Selector { .. }));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = SiteProfile::new("x", vec![], Some("(unclosed"), "h1", "p").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }

    #[test]
    fn test_site_id_display() {
        assert_eq!(SiteId::Reuters.to_string(), "reuters");
        assert_eq!(SiteId::Generic.to_string(), "generic");
    }

    #[test]
    fn test_site_id_yaml_alias() {
        let site: SiteId = serde_yaml::from_str("other").unwrap();
        assert_eq!(site, SiteId::Generic);
    }
}
