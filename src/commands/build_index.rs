use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use wikigraph::{archive::ArchiveIndex, config::Config};

pub fn build_index(
    config: Config,
    index_file: PathBuf,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    if !index_file.exists() {
        anyhow::bail!("Index file not found: {}", index_file.display());
    }
    let output = output.unwrap_or_else(|| config.archive.persisted_index_path.clone());

    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Reading {}", index_file.display()));
        Some(pb)
    };

    let started = Instant::now();
    let index = ArchiveIndex::from_index_file(&index_file, |lines| {
        if let Some(pb) = &spinner {
            pb.set_message(format!("{} lines", lines));
        }
    })
    .with_context(|| format!("Failed to build index from '{}'", index_file.display()))?;

    index
        .save(&output)
        .with_context(|| format!("Failed to write index to '{}'", output.display()))?;

    if let Some(pb) = spinner {
        pb.finish_with_message(format!(
            "{} articles in {} blocks",
            index.len(),
            index.blocks().len()
        ));
    }

    info!(
        "Wrote index of {} articles to {} in {:.1}s",
        index.len(),
        output.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
