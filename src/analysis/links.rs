//! Outgoing internal links of an article

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A linked article title and its URL path form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutgoingLink {
    pub title: String,
    /// Title with spaces replaced by underscores, as used in article URLs
    pub reference: String,
}

impl OutgoingLink {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let reference = canonical_reference(&title);
        Self { title, reference }
    }
}

/// URL path form of a title
pub fn canonical_reference(title: &str) -> String {
    title.replace(' ', "_")
}

/// Collect `[[target]]` / `[[target|label]]` links in first-seen order.
///
/// Only the link target is kept; category links and targets containing `&`
/// are dropped. A `[[` without a closing `]]` runs to the next `[[`, so the
/// target of a link wrapping other links is still found.
pub fn extract_links(text: &str) -> Vec<OutgoingLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for segment in text.split("[[").skip(1) {
        let inner = segment.find("]]").map_or(segment, |end| &segment[..end]);
        let title = inner.split('|').next().unwrap_or("").trim();

        if title.is_empty() || is_category(title) || title.contains('&') {
            continue;
        }
        if seen.insert(title.to_string()) {
            links.push(OutgoingLink::new(title));
        }
    }

    links
}

fn is_category(title: &str) -> bool {
    title
        .trim_start_matches(':')
        .get(..9)
        .map(|prefix| prefix.eq_ignore_ascii_case("category:"))
        .unwrap_or(false)
}
