//! Heuristic analysis of article wikitext
//!
//! Three passes over the raw body of an isolated page:
//!
//! - classification: is this article about a musical artist?
//! - outgoing links: which articles does it point to?
//! - infobox attributes: a small allow-listed set of normalised fields,
//!   only extracted for articles that classify as artists.
//!
//! None of this is a wikitext parser; it is deliberately shallow string work
//! and never fails.

pub mod classify;
pub mod infobox;
pub mod links;

pub use classify::is_target_category;
pub use infobox::{extract_attributes, ALLOWED_KEYS};
pub use links::{canonical_reference, extract_links, OutgoingLink};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default base for article URLs
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/wiki/";

/// Everything derived from one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    pub title: String,
    pub url: String,
    pub is_target_category: bool,
    pub outgoing_links: Vec<OutgoingLink>,
    /// Allow-listed infobox fields; empty unless `is_target_category`
    pub attributes: BTreeMap<String, String>,
}

impl AnalyzedArticle {
    /// Titles of the linked articles
    pub fn outgoing_titles(&self) -> impl Iterator<Item = &str> {
        self.outgoing_links.iter().map(|link| link.title.as_str())
    }
}

/// Turns article bodies into [`AnalyzedArticle`]s
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    base_url: String,
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ContentAnalyzer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn article_url(&self, title: &str) -> String {
        format!("{}{}", self.base_url, canonical_reference(title))
    }

    pub fn analyze(&self, title: &str, body: &str) -> AnalyzedArticle {
        let is_target = is_target_category(body);
        let attributes = if is_target {
            extract_attributes(body)
        } else {
            BTreeMap::new()
        };

        AnalyzedArticle {
            title: title.to_string(),
            url: self.article_url(title),
            is_target_category: is_target,
            outgoing_links: extract_links(body),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_artist() {
        let body = "{{Infobox musical artist\n| genre = [[Jazz]]\n}}\n[[Miles Davis]] and [[John Coltrane|Trane]]";
        let article = ContentAnalyzer::default().analyze("Bill Evans", body);

        assert!(article.is_target_category);
        assert_eq!(article.url, "https://en.wikipedia.org/wiki/Bill_Evans");
        assert_eq!(
            article.outgoing_titles().collect::<Vec<_>>(),
            vec!["Jazz", "Miles Davis", "John Coltrane"]
        );
        assert_eq!(article.attributes["genre"], "Jazz");
    }

    #[test]
    fn test_non_artist_skips_attributes() {
        let body = "{{Infobox scientist\n| genre = [[Physics]]\n}}\nSee [[Relativity]].";
        let article = ContentAnalyzer::new("http://localhost/wiki/").analyze("Albert Einstein", body);

        assert!(!article.is_target_category);
        assert!(article.attributes.is_empty());
        assert_eq!(article.url, "http://localhost/wiki/Albert_Einstein");
        assert_eq!(article.outgoing_titles().count(), 2);
    }

    #[test]
    fn test_serializes_to_json() {
        let article = ContentAnalyzer::default().analyze("X", "==Discography==\n[[Y]]");
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["is_target_category"], true);
        assert_eq!(json["outgoing_links"][0]["reference"], "Y");
    }
}
