//! Breadth-first crawl over article links, keeping only musical artists

use crate::analysis::AnalyzedArticle;
use crate::archive::BlockReader;
use crate::error::Result;
use crate::locator::RecordLocator;
use crate::store::{ClassificationCache, GraphStore, NodeHandle};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Header line of the seed list CSV
const SEED_HEADER: &str = "artist_title";

/// Counters from one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Titles run through the locator
    pub located: u64,
    /// Titles answered by the classification cache
    pub cache_hits: u64,
    /// Titles dropped because they are not artists
    pub skipped: u64,
    /// Titles that could not be located
    pub errors: u64,
    pub nodes: u64,
    pub edges: u64,
}

/// Read seed titles, one per line.
///
/// Blank lines and the `artist_title` header are ignored. Quoted CSV fields
/// are unquoted.
pub fn read_seed_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_seed_list(&content))
}

fn parse_seed_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter(|(i, line)| !(*i == 0 && *line == SEED_HEADER))
        .map(|(_, line)| unquote(line))
        .collect()
}

fn unquote(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}

/// Drives the locator over the link graph and writes artists to a [`GraphStore`]
pub struct CrawlController<'a, R, C, G> {
    locator: &'a RecordLocator<R, C>,
    graph: &'a mut G,
    max_depth: usize,
    max_articles: usize,
    nodes: HashMap<String, NodeHandle>,
    edges: HashSet<(NodeHandle, NodeHandle)>,
    /// Titles that failed to locate during this crawl
    failed: HashSet<String>,
    stats: CrawlStats,
}

impl<'a, R, C, G> CrawlController<'a, R, C, G>
where
    R: BlockReader,
    C: ClassificationCache,
    G: GraphStore,
{
    pub fn new(locator: &'a RecordLocator<R, C>, graph: &'a mut G) -> Self {
        Self {
            locator,
            graph,
            max_depth: 2,
            max_articles: 1000,
            nodes: HashMap::new(),
            edges: HashSet::new(),
            failed: HashSet::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Articles at this depth are added but their links are not followed
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    fn limit_reached(&self) -> bool {
        self.nodes.len() >= self.max_articles
    }

    fn add_node(&mut self, article: &AnalyzedArticle) -> Result<NodeHandle> {
        let handle = self.graph.add_node(article)?;
        if self.nodes.insert(article.title.clone(), handle).is_none() {
            self.stats.nodes += 1;
        }
        Ok(handle)
    }

    fn add_edge(&mut self, source: NodeHandle, dest: NodeHandle) -> Result<()> {
        self.graph.add_edge(source, dest)?;
        if self.edges.insert((source, dest)) {
            self.stats.edges += 1;
        }
        Ok(())
    }

    fn locate(&mut self, title: &str) -> Option<AnalyzedArticle> {
        if self.failed.contains(title) {
            return None;
        }
        match self.locator.locate(title) {
            Ok(article) => {
                self.stats.located += 1;
                Some(article)
            }
            Err(e) => {
                self.stats.errors += 1;
                self.failed.insert(title.to_string());
                if e.is_unavailable() {
                    debug!("Skipping '{}': {}", title, e);
                } else {
                    warn!("Skipping '{}': {}", title, e);
                }
                None
            }
        }
    }

    /// Whether the cache already rules `title` out
    fn cached_negative(&mut self, title: &str) -> bool {
        match self.locator.cache().get(title) {
            Ok(Some(is_target)) => {
                self.stats.cache_hits += 1;
                !is_target
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Classification cache lookup failed for '{}': {}", title, e);
                false
            }
        }
    }

    /// Crawl outward from `seeds`.
    ///
    /// Lookup failures only skip the title; graph store failures abort.
    pub fn run(mut self, seeds: &[String]) -> Result<CrawlStats> {
        info!(
            "Starting crawl from {} seeds (max depth {}, max articles {})",
            seeds.len(),
            self.max_depth,
            self.max_articles
        );

        let mut queue: VecDeque<(AnalyzedArticle, NodeHandle, usize)> = VecDeque::new();

        for seed in seeds {
            if self.limit_reached() {
                break;
            }
            if self.nodes.contains_key(seed) {
                continue;
            }
            if let Some(article) = self.locate(seed) {
                let handle = self.add_node(&article)?;
                queue.push_back((article, handle, 0));
            }
        }

        'crawl: while let Some((article, source, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }
            debug!("Expanding '{}' at depth {}", article.title, depth);

            for link in article.outgoing_titles() {
                if link == article.title {
                    continue;
                }
                if let Some(&dest) = self.nodes.get(link) {
                    self.add_edge(source, dest)?;
                    continue;
                }
                if self.cached_negative(link) {
                    self.stats.skipped += 1;
                    continue;
                }
                if self.limit_reached() {
                    break 'crawl;
                }

                let Some(found) = self.locate(link) else {
                    continue;
                };
                if !found.is_target_category {
                    self.stats.skipped += 1;
                    continue;
                }

                let dest = self.add_node(&found)?;
                self.add_edge(source, dest)?;
                queue.push_back((found, dest, depth + 1));
            }
        }

        if let Err(e) = self.locator.cache().flush() {
            warn!("Failed to flush classification cache: {}", e);
        }

        info!(
            "Crawl finished: {} nodes, {} edges, {} located, {} cache hits, {} skipped, {} errors",
            self.stats.nodes,
            self.stats.edges,
            self.stats.located,
            self.stats.cache_hits,
            self.stats.skipped,
            self.stats.errors
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ContentAnalyzer;
    use crate::archive::{ArchiveIndex, BlockRange};
    use crate::error::ArchiveError;
    use crate::store::{MemoryClassificationCache, MemoryGraphStore};
    use parking_lot::Mutex;
    use std::io::Write;

    /// Every page lives in its own block, keyed by start offset = page id
    struct PageReader {
        pages: HashMap<u64, String>,
        reads: Mutex<Vec<u64>>,
    }

    impl BlockReader for PageReader {
        fn read_block(&self, range: &BlockRange) -> Result<String> {
            self.reads.lock().push(range.start);
            self.pages
                .get(&range.start)
                .cloned()
                .ok_or_else(|| ArchiveError::Decompression("missing".to_string()))
        }
    }

    fn artist(links: &[&str]) -> String {
        let mut body = String::from("{{Infobox musical artist\n| genre = Pop\n}}\n");
        for link in links {
            body.push_str(&format!("[[{}]] ", link));
        }
        body
    }

    fn other(links: &[&str]) -> String {
        links.iter().map(|l| format!("[[{}]] ", l)).collect()
    }

    /// A -> B, C, Film;  B -> A, D;  C -> Ghost;  D -> E;  E -> A
    fn locator() -> RecordLocator<PageReader, MemoryClassificationCache> {
        build_locator(
            &[
                ("A", artist(&["B", "C", "Film", "A"])),
                ("B", artist(&["A", "D"])),
                ("C", artist(&["Ghost"])),
                ("D", artist(&["E"])),
                ("E", artist(&["A"])),
                ("Film", other(&["A"])),
            ],
            "",
        )
    }

    /// `extra_index` lists titles whose blocks the reader cannot serve
    fn build_locator(
        articles: &[(&str, String)],
        extra_index: &str,
    ) -> RecordLocator<PageReader, MemoryClassificationCache> {
        let mut index_text = String::new();
        let mut pages = HashMap::new();
        for (i, (title, body)) in articles.iter().enumerate() {
            let id = (i as u64 + 1) * 100;
            index_text.push_str(&format!("{}:{}:{}\n", id, id, title));
            pages.insert(
                id,
                format!(
                    "<page><title>{}</title><id>{}</id><revision><text>{}</text></revision></page>",
                    title, id, body
                ),
            );
        }

        index_text.push_str(extra_index);

        let index = ArchiveIndex::from_reader(index_text.as_bytes()).unwrap();
        let reader = PageReader {
            pages,
            reads: Mutex::new(Vec::new()),
        };
        RecordLocator::new(
            index,
            reader,
            ContentAnalyzer::default(),
            MemoryClassificationCache::new(),
        )
    }

    fn seeds(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_full_crawl() {
        let locator = locator();
        let mut graph = MemoryGraphStore::new();
        let stats = CrawlController::new(&locator, &mut graph)
            .with_max_depth(10)
            .run(&seeds(&["A"]))
            .unwrap();

        assert_eq!(graph.node_count(), 5);
        assert_eq!(stats.nodes, 5);
        // A->B, A->C, B->A, B->D, D->E, E->A
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(stats.edges, 6);
        assert_eq!(stats.errors, 1); // Ghost
        assert_eq!(stats.skipped, 1); // Film
    }

    #[test]
    fn test_stops_at_max_depth() {
        let locator = locator();
        let mut graph = MemoryGraphStore::new();
        CrawlController::new(&locator, &mut graph)
            .with_max_depth(1)
            .run(&seeds(&["A"]))
            .unwrap();

        // A at depth 0 is expanded, B and C at depth 1 are not
        assert_eq!(graph.node_count(), 3);
        let d = ContentAnalyzer::default().article_url("D");
        assert!(graph.find(&d).is_none());
    }

    #[test]
    fn test_max_depth_zero_keeps_only_seeds() {
        let locator = locator();
        let mut graph = MemoryGraphStore::new();
        let stats = CrawlController::new(&locator, &mut graph)
            .with_max_depth(0)
            .run(&seeds(&["A", "D"]))
            .unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(stats.edges, 0);
    }

    #[test]
    fn test_stops_at_max_articles() {
        let locator = locator();
        let mut graph = MemoryGraphStore::new();
        CrawlController::new(&locator, &mut graph)
            .with_max_depth(10)
            .with_max_articles(2)
            .run(&seeds(&["A"]))
            .unwrap();
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_cached_negative_is_not_located_again() {
        let locator = locator();
        locator.cache().put("Film", false).unwrap();

        let mut graph = MemoryGraphStore::new();
        let stats = CrawlController::new(&locator, &mut graph)
            .with_max_depth(1)
            .run(&seeds(&["A"]))
            .unwrap();

        // Film lives at offset 600
        assert!(!locator.reader().reads.lock().contains(&600));
        assert!(stats.cache_hits >= 1);
    }

    #[test]
    fn test_failed_title_is_not_retried() {
        let locator = build_locator(
            &[
                ("X", artist(&["Lost", "Y"])),
                ("Y", artist(&["Lost", "Z"])),
                ("Z", artist(&["Lost"])),
            ],
            "900:900:Lost\n",
        );
        let mut graph = MemoryGraphStore::new();
        let stats = CrawlController::new(&locator, &mut graph)
            .with_max_depth(5)
            .run(&seeds(&["X"]))
            .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(stats.errors, 1);
        let lost_reads = locator
            .reader()
            .reads
            .lock()
            .iter()
            .filter(|&&start| start == 900)
            .count();
        assert_eq!(lost_reads, 1);
    }

    #[test]
    fn test_missing_seed_is_not_fatal() {
        let locator = locator();
        let mut graph = MemoryGraphStore::new();
        let stats = CrawlController::new(&locator, &mut graph)
            .with_max_depth(0)
            .run(&seeds(&["Nobody", "E"]))
            .unwrap();
        assert_eq!(stats.errors, 1);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_read_seed_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "artist_title\nPrince\n\n\"Earth, Wind & Fire\"\n  Björk  \n").unwrap();

        let seeds = read_seed_list(file.path()).unwrap();
        assert_eq!(seeds, vec!["Prince", "Earth, Wind & Fire", "Björk"]);
    }

    #[test]
    fn test_seed_list_without_header() {
        assert_eq!(parse_seed_list("Prince\nartist_title\n"), vec!["Prince", "artist_title"]);
    }
}
