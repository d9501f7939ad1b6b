use super::open_locator;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use wikigraph::{
    config::Config,
    store::{ClassificationCache, FileClassificationCache},
};

pub fn locate_article(config: Config, title: String, markup_out: Option<PathBuf>) -> Result<()> {
    let cache = FileClassificationCache::open(&config.crawl.cache_path)
        .with_context(|| format!("Failed to open cache '{}'", config.crawl.cache_path.display()))?;
    let locator = open_locator(&config, cache)?;

    let (article, record) = locator
        .locate_with_record(&title)
        .with_context(|| format!("Failed to locate '{}'", title))?;

    if let Some(path) = markup_out {
        std::fs::write(&path, &record.markup)
            .with_context(|| format!("Failed to write markup to '{}'", path.display()))?;
        info!("Wrote markup of '{}' to {}", title, path.display());
    }

    locator.cache().flush()?;
    println!("{}", serde_json::to_string_pretty(&article)?);
    Ok(())
}
