//! Infobox attribute extraction
//!
//! Infobox values follow loose and inconsistent editor conventions, so each
//! allowed key has its own normalisation rule. The rules are plain string
//! slicing and are kept as separate functions on purpose.

use std::collections::{BTreeMap, BTreeSet};

/// Infobox keys worth keeping; a parameter is kept under every token its key contains
pub const ALLOWED_KEYS: [&str; 14] = [
    "birth_name",
    "birth_date",
    "birth_place",
    "alias",
    "occupation",
    "years_active",
    "net_worth",
    "website",
    "origin",
    "background",
    "genre",
    "label",
    "instrument",
    "organization",
];

const LIST_MARKERS: [&str; 3] = ["flatlist", "plainlist", "hlist"];

/// Extract normalised allow-listed attributes from every `{{Infobox ...}}`
/// template in the article. Later parameters overwrite earlier ones; values
/// that normalise to nothing are left out.
pub fn extract_attributes(text: &str) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();

    for template in find_templates(text) {
        let mut parts = split_params(template).into_iter();
        let name = parts.next().unwrap_or("");
        if !name.contains("Infobox") {
            continue;
        }

        for param in parts {
            if !param.contains('=') || param.starts_with('=') {
                continue;
            }
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let value = value.trim();

            for token in ALLOWED_KEYS.iter().filter(|token| key.contains(**token)) {
                if let Some(normalised) = transform(token, value) {
                    if !normalised.is_empty() {
                        attributes.insert(token.to_string(), normalised);
                    }
                }
            }
        }
    }

    attributes
}

/// Apply the rule for `token` to a trimmed parameter value
pub fn transform(token: &str, value: &str) -> Option<String> {
    match token {
        "birth_date" => birth_date(value),
        "net_worth" => Some(net_worth(value)),
        "website" => website(value),
        "years_active" => Some(years_active(value)),
        "birth_place" | "origin" => Some(place(value)),
        "background" => Some(background(value)),
        _ => Some(generic(value)),
    }
}

/// `{{Birth date and age|1958|6|7}}` -> `1958/6/7`; anything without exactly
/// three numeric fields is dropped
pub fn birth_date(value: &str) -> Option<String> {
    let inner = match value.find("}}<ref") {
        Some(pos) => &value[..pos],
        None => strip_chars(value, 2, 2),
    };

    let numbers: Vec<&str> = inner
        .split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .collect();

    if numbers.len() == 3 {
        Some(numbers.join("/"))
    } else {
        None
    }
}

pub fn net_worth(value: &str) -> String {
    before(value, "<ref").replace("&nbsp;", " ").trim().to_string()
}

/// Unwraps `{{URL|example.com}}`
pub fn website(value: &str) -> Option<String> {
    if value.chars().count() < 8 {
        return None;
    }
    Some(strip_chars(value, 6, 2).to_string())
}

pub fn years_active(value: &str) -> String {
    value.replace('–', "-")
}

/// Place names: every comma-separated entry is unlinked and the distinct
/// entries are joined back in sorted order
pub fn place(value: &str) -> String {
    let entries: BTreeSet<String> = before(value, "<ref")
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .split('|')
                .map(strip_link)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();

    entries.into_iter().collect::<Vec<_>>().join(", ")
}

/// `solo_singer <!-- comment -->` -> `solo singer`
pub fn background(value: &str) -> String {
    before(value, "<!").trim().replace('_', " ")
}

/// Fallback for keys without a dedicated rule
pub fn generic(value: &str) -> String {
    if is_list(value) {
        list_items(value)
    } else if value.contains("[[") {
        linked_values(value)
    } else {
        value.trim().to_string()
    }
}

fn is_list(value: &str) -> bool {
    let lower = value.to_lowercase();
    LIST_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// `{{flatlist|\n* [[Pop music|Pop]]\n* [[Funk]]\n}}` -> `Pop music, Funk`
pub fn list_items(value: &str) -> String {
    let items: Vec<&str> = if value.contains('\n') {
        value.split('\n').collect()
    } else {
        value.split(',').collect()
    };
    if items.len() < 3 {
        return String::new();
    }

    items[1..items.len() - 1]
        .iter()
        .map(|item| {
            let item = skip_first_char(item).trim();
            if item.contains("[[") && item.contains('|') {
                let target = item.split('|').next().unwrap_or("");
                target.strip_prefix("[[").unwrap_or(target).to_string()
            } else if item.starts_with("[[") && item.ends_with("]]") && item.len() >= 4 {
                item[2..item.len() - 2].to_string()
            } else {
                item.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `[[Singer]], [[Songwriter|songwriting]]` -> `Singer, Songwriter`
pub fn linked_values(value: &str) -> String {
    value
        .split(", ")
        .map(|piece| strip_link(piece.split('|').next().unwrap_or("")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inner text of every `{{...}}` at any nesting depth, outermost first
fn find_templates(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut open = Vec::new();
    let mut found = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            open.push(i + 2);
            i += 2;
        } else if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            if let Some(start) = open.pop() {
                found.push((start, &text[start..i]));
            }
            i += 2;
        } else {
            i += 1;
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, inner)| inner).collect()
}

/// Split template contents on `|` outside nested templates and links.
/// The first element is the template name.
fn split_params(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut braces = 0usize;
    let mut brackets = 0usize;
    let mut parts = Vec::new();
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match (bytes[i], next) {
            (b'{', Some(b'{')) => {
                braces += 1;
                i += 2;
                continue;
            }
            (b'}', Some(b'}')) => {
                braces = braces.saturating_sub(1);
                i += 2;
                continue;
            }
            (b'[', Some(b'[')) => {
                brackets += 1;
                i += 2;
                continue;
            }
            (b']', Some(b']')) => {
                brackets = brackets.saturating_sub(1);
                i += 2;
                continue;
            }
            (b'|', _) if braces == 0 && brackets == 0 => {
                parts.push(&inner[last..i]);
                last = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    parts.push(&inner[last..]);
    parts[0] = parts[0].trim();
    parts
}

fn before<'a>(value: &'a str, marker: &str) -> &'a str {
    value.split(marker).next().unwrap_or("")
}

fn strip_link(s: &str) -> &str {
    let s = s.strip_prefix("[[").unwrap_or(s);
    s.strip_suffix("]]").unwrap_or(s)
}

fn skip_first_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

/// Drop `front` leading and `back` trailing characters
fn strip_chars(s: &str, front: usize, back: usize) -> &str {
    let count = s.chars().count();
    if count <= front + back {
        return "";
    }
    let offset = |n: usize| s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len());
    &s[offset(front)..offset(count - back)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINCE: &str = r#"{{Short description|American musician}}
{{Infobox musical artist
| name = Prince
| birth_name = Prince Rogers Nelson
| birth_date = {{Birth date|1958|6|7}}
| birth_place = [[Minneapolis]], [[Minnesota]], U.S.
| death_date = {{Death date and age|2016|4|21|1958|6|7}}
| alias = {{flatlist|
* Jamie Starr
* [[Camille (album)|Camille]]
* Joey Coco
}}
| occupation = {{hlist|Singer|songwriter}}
| years_active = 1975–2016
| background = solo_singer <!-- person -->
| genre = {{flatlist|
* [[Funk]]
* [[Pop music|Pop]]
* [[Rhythm and blues|R&B]]
}}
| instrument = [[Vocals]], [[guitar]], [[Keyboard instrument|keyboards]]
| label = [[Warner Bros. Records|Warner Bros.]]
| website = {{URL|prince.com}}
| net_worth = US$300&nbsp;million<ref>{{cite web|url=https://example.com}}</ref>
}}
'''Prince Rogers Nelson''' was an American [[singer-songwriter]]."#;

    #[test]
    fn test_prince_attributes() {
        let attrs = extract_attributes(PRINCE);

        assert_eq!(attrs["birth_name"], "Prince Rogers Nelson");
        assert_eq!(attrs["birth_date"], "1958/6/7");
        assert_eq!(attrs["birth_place"], "Minneapolis, Minnesota, U.S.");
        assert_eq!(attrs["alias"], "Jamie Starr, Camille (album), Joey Coco");
        assert_eq!(attrs["years_active"], "1975-2016");
        assert_eq!(attrs["background"], "solo singer");
        assert_eq!(attrs["genre"], "Funk, Pop music, Rhythm and blues");
        assert_eq!(attrs["instrument"], "Vocals, guitar, Keyboard instrument");
        assert_eq!(attrs["label"], "Warner Bros. Records");
        assert_eq!(attrs["website"], "prince.com");
        assert_eq!(attrs["net_worth"], "US$300 million");

        // Not in the allow-list
        assert!(!attrs.contains_key("name"));
        assert!(!attrs.contains_key("death_date"));
        // hlist without newlines collapses to nothing and is left out
        assert!(!attrs.contains_key("occupation"));
    }

    #[test]
    fn test_only_infobox_templates() {
        let attrs = extract_attributes("{{Cite web| genre = Jazz}} {{Other| label = X}}");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_last_write_wins_across_infoboxes() {
        let text = "{{Infobox person| genre = Jazz}}\n{{Infobox musical artist| genre = Blues}}";
        assert_eq!(extract_attributes(text)["genre"], "Blues");
    }

    #[test]
    fn test_key_matched_by_containment() {
        let text = "{{Infobox musical artist| current_label = Motown | origin_city = Detroit}}";
        let attrs = extract_attributes(text);
        assert_eq!(attrs["label"], "Motown");
        assert_eq!(attrs["origin"], "Detroit");
    }

    #[test]
    fn test_positional_and_leading_equals_params_skipped() {
        let text = "{{Infobox musical artist|genre|=genre = x| genre = Soul}}";
        assert_eq!(extract_attributes(text)["genre"], "Soul");
    }

    #[test]
    fn test_birth_date() {
        assert_eq!(birth_date("{{Birth date|1990|5|12}}").as_deref(), Some("1990/5/12"));
        assert_eq!(birth_date("{{Birth date|1990|5}}"), None);
        assert_eq!(
            birth_date("{{birth date and age|1942|11|27}}<ref>cite</ref>").as_deref(),
            Some("1942/11/27")
        );
        assert_eq!(
            birth_date("{{Birth date and age|df=yes|1971|03|04}}").as_deref(),
            Some("1971/03/04")
        );
        assert_eq!(birth_date("June 7, 1958"), None);
        assert_eq!(birth_date(""), None);
    }

    #[test]
    fn test_net_worth() {
        assert_eq!(net_worth("US$1.2&nbsp;billion<ref name=f/>"), "US$1.2 billion");
        assert_eq!(net_worth("unknown"), "unknown");
    }

    #[test]
    fn test_website() {
        assert_eq!(website("{{URL|example.com}}").as_deref(), Some("example.com"));
        assert_eq!(website("{{URL}}"), None);
    }

    #[test]
    fn test_years_active() {
        assert_eq!(years_active("1990–present"), "1990-present");
    }

    #[test]
    fn test_place_dedups_and_unlinks() {
        assert_eq!(
            place("[[Atlanta]], [[Georgia (U.S. state)|Georgia]]<ref>x</ref>"),
            "Atlanta, Georgia (U.S. state), Georgia"
        );
        assert_eq!(place("London, England, London"), "England, London");
    }

    #[test]
    fn test_place_trims_entries_before_unlinking() {
        assert_eq!(place(" [[Minnesota]]"), "Minnesota");
        assert_eq!(place("[[Minneapolis]], [[Minnesota]]"), "Minneapolis, Minnesota");
    }

    #[test]
    fn test_background() {
        assert_eq!(background("group_or_band<!-- band -->"), "group or band");
    }

    #[test]
    fn test_list_items() {
        assert_eq!(
            list_items("{{plainlist|\n* [[Rock music|Rock]]\n* [[Blues]]\n* Folk\n}}"),
            "Rock music, Blues, Folk"
        );
        assert_eq!(list_items("{{hlist|a|b}}"), "");
    }

    #[test]
    fn test_linked_values() {
        assert_eq!(
            linked_values("[[Singer]], [[Songwriter|songwriting]], producer"),
            "Singer, Songwriter, producer"
        );
    }

    #[test]
    fn test_generic_plain_value() {
        assert_eq!(generic("  The Purple One "), "The Purple One");
    }

    #[test]
    fn test_nested_templates_found() {
        let templates = find_templates("{{Outer|a={{Inner|b}}}}");
        assert_eq!(templates, vec!["Outer|a={{Inner|b}}", "Inner|b"]);
    }

    #[test]
    fn test_split_params_respects_nesting() {
        let parts = split_params(" Infobox x | a = [[B|c]] | d = {{e|f}}");
        assert_eq!(parts, vec!["Infobox x", " a = [[B|c]] ", " d = {{e|f}}"]);
    }

    #[test]
    fn test_strip_chars_multibyte() {
        assert_eq!(strip_chars("{{é–ü}}", 2, 2), "é–ü");
        assert_eq!(strip_chars("abc", 2, 2), "");
    }
}
