//! Isolate a single `<page>` out of a decompressed block
//!
//! A block is a run of concatenated `<page>` elements (the first one also
//! carries the `<mediawiki>`/`<siteinfo>` preamble, the last one the closing
//! tag), so it is never a well-formed document on its own. The scanner only
//! cares about page boundaries: it rebuilds the markup of the page currently
//! being read and throws it away at `</page>` unless the page id matches.

use super::index::IndexEntry;
use crate::error::{ArchiveError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

const RECORD_TAG: &str = "page";
const ID_TAG: &str = "id";
const TEXT_TAG: &str = "text";

/// The page that matched the requested id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsolatedRecord {
    pub record_id: u64,
    /// The page element rebuilt from the scanned events
    pub markup: String,
    /// Longest `<text>` run of the page, i.e. the article wikitext
    pub body_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between pages, waiting for `<page>`
    ExpectRecordStart,
    InRecord,
    InIdTag,
    InTextTag,
    /// Target page captured, everything else is ignored
    Done,
}

/// Streaming scanner for one target page id
#[derive(Debug)]
pub struct RecordIsolator {
    record_id: u64,
    target: String,
    state: ScanState,
    current_id: Option<String>,
    current_lines: Vec<String>,
    longest_text: Option<String>,
    longest_len: usize,
    result: Option<IsolatedRecord>,
}

impl RecordIsolator {
    pub fn new(record_id: u64) -> Self {
        Self {
            record_id,
            target: record_id.to_string(),
            state: ScanState::ExpectRecordStart,
            current_id: None,
            current_lines: Vec::new(),
            longest_text: None,
            longest_len: 0,
            result: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ScanState::Done
    }

    /// Scan a block and return the matching page, if it is in there
    pub fn scan(mut self, block: &str) -> Option<IsolatedRecord> {
        let mut reader = Reader::from_str(block);
        reader.check_end_names(false);
        reader.trim_text(false);

        while !self.is_done() {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = tag_name(e.name().as_ref());
                    self.start_tag(&name, render_start_tag(&name, &e));
                }
                Ok(Event::Empty(e)) => {
                    let name = tag_name(e.name().as_ref());
                    self.start_tag(&name, render_start_tag(&name, &e));
                    self.end_tag(&name);
                }
                Ok(Event::Text(e)) => {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    self.data(text);
                }
                Ok(Event::CData(e)) => {
                    self.data(String::from_utf8_lossy(&e).into_owned());
                }
                Ok(Event::End(e)) => {
                    let name = tag_name(e.name().as_ref());
                    self.end_tag(&name);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    // Truncated or garbled tail; nothing after this point can match
                    debug!(
                        "Stopping block scan at byte {}: {}",
                        reader.buffer_position(),
                        e
                    );
                    break;
                }
            }
        }

        self.result
    }

    fn start_tag(&mut self, name: &str, rendered: String) {
        match self.state {
            ScanState::Done => return,
            _ if name == RECORD_TAG => {
                self.current_id = None;
                self.current_lines.clear();
                self.longest_text = None;
                self.longest_len = 0;
                self.current_lines.push(rendered);
                self.state = ScanState::InRecord;
                return;
            }
            ScanState::ExpectRecordStart => return,
            _ => {}
        }

        self.current_lines.push(rendered);
        self.state = match name {
            ID_TAG => ScanState::InIdTag,
            TEXT_TAG => ScanState::InTextTag,
            _ => ScanState::InRecord,
        };
    }

    fn data(&mut self, text: String) {
        match self.state {
            ScanState::Done | ScanState::ExpectRecordStart => return,
            ScanState::InIdTag => {
                if self.current_id.is_none() {
                    self.current_id = Some(text.clone());
                }
            }
            ScanState::InTextTag => {
                let len = text.chars().count();
                if self.longest_text.is_none() || len > self.longest_len {
                    self.longest_text = Some(text.clone());
                    self.longest_len = len;
                }
            }
            ScanState::InRecord => {}
        }
        self.current_lines.push(text);
    }

    fn end_tag(&mut self, name: &str) {
        if matches!(self.state, ScanState::Done | ScanState::ExpectRecordStart) {
            return;
        }

        self.current_lines.push(format!("</{}>", name));
        self.state = ScanState::InRecord;

        if name != RECORD_TAG {
            return;
        }

        let matched = self
            .current_id
            .as_deref()
            .map(|id| id.trim() == self.target)
            .unwrap_or(false);

        if matched {
            self.result = Some(IsolatedRecord {
                record_id: self.record_id,
                markup: self.current_lines.concat(),
                body_text: self.longest_text.take(),
            });
            self.current_lines.clear();
            self.state = ScanState::Done;
        } else {
            self.current_lines.clear();
            self.state = ScanState::ExpectRecordStart;
        }
    }
}

/// Pull the page described by `entry` out of its decompressed block
pub fn isolate_record(block: &str, entry: &IndexEntry) -> Result<IsolatedRecord> {
    RecordIsolator::new(entry.record_id)
        .scan(block)
        .ok_or_else(|| ArchiveError::RecordNotFound {
            title: entry.title.clone(),
            record_id: entry.record_id,
        })
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn render_start_tag(name: &str, tag: &BytesStart<'_>) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('<');
    out.push_str(name);
    for attr in tag.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        let _ = write!(out, " {}=\"{}\"", key, value);
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::index::BlockRange;

    fn page(title: &str, id: u64, revision_id: u64, text: &str) -> String {
        format!(
            "  <page>\n    <title>{}</title>\n    <ns>0</ns>\n    <id>{}</id>\n    <revision>\n      <id>{}</id>\n      <comment>short note</comment>\n      <text xml:space=\"preserve\">{}</text>\n    </revision>\n  </page>\n",
            title, id, revision_id, text
        )
    }

    fn three_page_block() -> String {
        let mut block = String::from(
            "<mediawiki xmlns=\"http://www.mediawiki.org/xml/export-0.10/\" xml:lang=\"en\">\n  <siteinfo>\n    <sitename>Wikipedia</sitename>\n  </siteinfo>\n",
        );
        block.push_str(&page("First", 7, 700, "first body text"));
        block.push_str(&page("Second", 9, 900, "second body with {{Infobox musical artist}}"));
        block.push_str(&page("Third", 11, 1100, "third body text"));
        block
    }

    #[test]
    fn test_isolates_middle_record_exactly() {
        let record = RecordIsolator::new(9).scan(&three_page_block()).unwrap();

        let expected = page("Second", 9, 900, "second body with {{Infobox musical artist}}")
            .trim_start()
            .trim_end()
            .to_string();
        assert_eq!(record.record_id, 9);
        assert_eq!(record.markup, expected);
        assert!(!record.markup.contains("First"));
        assert!(!record.markup.contains("Third"));
        assert_eq!(
            record.body_text.as_deref(),
            Some("second body with {{Infobox musical artist}}")
        );
    }

    #[test]
    fn test_first_and_last_records() {
        let block = three_page_block();
        let first = RecordIsolator::new(7).scan(&block).unwrap();
        assert!(first.markup.contains("<title>First</title>"));
        assert!(!first.markup.contains("siteinfo"));

        let last = RecordIsolator::new(11).scan(&block).unwrap();
        assert!(last.markup.contains("<title>Third</title>"));
    }

    #[test]
    fn test_revision_id_does_not_match() {
        assert!(RecordIsolator::new(900).scan(&three_page_block()).is_none());
    }

    #[test]
    fn test_missing_record_is_error() {
        let entry = IndexEntry {
            title: "Ghost".to_string(),
            record_id: 42,
            range: BlockRange::new(0, None),
        };
        let err = isolate_record(&three_page_block(), &entry).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::RecordNotFound { record_id: 42, ref title } if title == "Ghost"
        ));
    }

    #[test]
    fn test_longest_text_wins() {
        let block = "<page><id>5</id><text>short</text><text>the much longer body</text><text>mid size</text></page>";
        let record = RecordIsolator::new(5).scan(block).unwrap();
        assert_eq!(record.body_text.as_deref(), Some("the much longer body"));
    }

    #[test]
    fn test_non_text_data_is_not_body() {
        let block = "<page><id>5</id><comment>a very long edit summary that is not the body</comment><text>body</text></page>";
        let record = RecordIsolator::new(5).scan(block).unwrap();
        assert_eq!(record.body_text.as_deref(), Some("body"));
    }

    #[test]
    fn test_stops_after_match_and_tolerates_truncated_tail() {
        let mut block = page("Keep", 3, 30, "keep me");
        block.push_str("  <page>\n    <title>Cut off</title>\n    <id>4</id>\n    <revision><text>trunc");
        let record = RecordIsolator::new(3).scan(&block).unwrap();
        assert!(record.markup.contains("keep me"));

        // The truncated page can never be completed, so it is not found
        assert!(RecordIsolator::new(4).scan(&block).is_none());
    }

    #[test]
    fn test_garbage_after_match_is_ignored() {
        let mut block = page("Keep", 3, 30, "keep me");
        block.push_str("</mismatched><<<not xml");
        assert!(RecordIsolator::new(3).scan(&block).is_some());
    }

    #[test]
    fn test_entities_unescaped_and_attributes_rebuilt() {
        let block = "<page><title>AT&amp;T</title><id>8</id><redirect title=\"AT&amp;T Inc.\" /><text xml:space=\"preserve\">a &lt;ref&gt;cite&lt;/ref&gt; b</text></page>";
        let record = RecordIsolator::new(8).scan(block).unwrap();
        assert_eq!(record.body_text.as_deref(), Some("a <ref>cite</ref> b"));
        assert_eq!(
            record.markup,
            "<page><title>AT&T</title><id>8</id><redirect title=\"AT&T Inc.\"></redirect><text xml:space=\"preserve\">a <ref>cite</ref> b</text></page>"
        );
    }

    #[test]
    fn test_id_compared_as_trimmed_string() {
        let block = "<page><id> 12 </id><text>x</text></page>";
        assert!(RecordIsolator::new(12).scan(block).is_some());
    }

    #[test]
    fn test_record_without_text() {
        let block = "<page><title>Empty</title><id>2</id></page>";
        let record = RecordIsolator::new(2).scan(block).unwrap();
        assert_eq!(record.body_text, None);
    }
}
