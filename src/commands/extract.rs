use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use wikigraph::{archive::Bz2RangeReader, config::Config};

pub fn extract_range(
    config: Config,
    start: u64,
    end: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let reader = Bz2RangeReader::new(&config.archive.archive_path).with_context(|| {
        format!(
            "Failed to open archive '{}'",
            config.archive.archive_path.display()
        )
    })?;
    let text = reader.decompress(start, end)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!("Wrote {} bytes to {}", text.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
