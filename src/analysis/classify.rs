//! Musical artist classification

/// Markers whose presence marks an article as a musical artist
pub const TARGET_MARKERS: [&str; 2] = ["Infobox musical artist", "==Discography=="];

/// Substring heuristic: false positives (a band member's discography section on
/// a non-artist page) and false negatives (artists without either marker) are
/// accepted.
pub fn is_target_category(text: &str) -> bool {
    TARGET_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infobox_marker() {
        assert!(is_target_category(
            "{{Infobox musical artist\n| name = Prince\n}}"
        ));
    }

    #[test]
    fn test_discography_marker() {
        assert!(is_target_category("Intro.\n\n==Discography==\n* Album"));
    }

    #[test]
    fn test_unrelated_article() {
        assert!(!is_target_category("{{Infobox scientist\n| name = Albert Einstein\n}}"));
        // Spacing inside the heading defeats the literal match
        assert!(!is_target_category("== Discography =="));
        assert!(!is_target_category(""));
    }
}
