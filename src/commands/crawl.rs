use super::open_locator;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use wikigraph::{
    config::Config,
    crawl::{read_seed_list, CrawlController},
    store::{ClassificationCache, FileClassificationCache, MemoryGraphStore},
};

pub fn run_crawl(
    config: Config,
    seeds: Option<PathBuf>,
    max_depth: Option<usize>,
    max_articles: Option<usize>,
    output: Option<PathBuf>,
    fresh: bool,
) -> Result<()> {
    let seed_path = seeds.unwrap_or_else(|| config.crawl.seed_path.clone());
    let output = output.unwrap_or_else(|| config.crawl.graph_path.clone());
    let max_depth = max_depth.unwrap_or(config.crawl.max_depth);
    let max_articles = max_articles.unwrap_or(config.crawl.max_articles);

    let seeds = read_seed_list(&seed_path)
        .with_context(|| format!("Failed to read seed list '{}'", seed_path.display()))?;
    if seeds.is_empty() {
        anyhow::bail!("Seed list {} is empty", seed_path.display());
    }

    let cache = FileClassificationCache::open(&config.crawl.cache_path)
        .with_context(|| format!("Failed to open cache '{}'", config.crawl.cache_path.display()))?
        .with_flush_interval(config.crawl.cache_flush_interval);
    if fresh {
        info!("Starting fresh: clearing classification cache");
        cache.clear()?;
    }

    let locator = open_locator(&config, cache)?;
    let mut graph = MemoryGraphStore::new();

    let stats = CrawlController::new(&locator, &mut graph)
        .with_max_depth(max_depth)
        .with_max_articles(max_articles)
        .run(&seeds)?;

    graph
        .save_json(&output)
        .with_context(|| format!("Failed to write graph to '{}'", output.display()))?;

    println!("Crawl complete:");
    println!("  Artists:      {}", stats.nodes);
    println!("  Links:        {}", stats.edges);
    println!("  Located:      {}", stats.located);
    println!("  Cache hits:   {}", stats.cache_hits);
    println!("  Skipped:      {}", stats.skipped);
    println!("  Errors:       {}", stats.errors);
    println!("  Graph:        {}", output.display());
    Ok(())
}
