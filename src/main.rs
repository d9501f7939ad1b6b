//! wikigraph: musical artist link graph from a Wikipedia multistream dump

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wikigraph::config::{Config, LogFormat, LogLevel};

#[derive(Parser)]
#[command(name = "wikigraph")]
#[command(about = "Random access into Wikipedia multistream dumps and an artist link crawler")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "wikigraph.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors, no progress output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the dump's index file and persist it for fast startup
    BuildIndex {
        /// `*-multistream-index.txt` or `.txt.bz2`
        index_file: PathBuf,

        /// Output path (defaults to archive.persisted_index_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Locate one article and print its analysis as JSON
    Locate {
        /// Article title, exactly as in the index
        title: String,

        /// Also write the reconstructed page markup here
        #[arg(long)]
        markup_out: Option<PathBuf>,
    },

    /// Decompress a raw byte range of the archive
    Extract {
        /// First byte of the bzip2 stream
        #[arg(long)]
        start: u64,

        /// One past the last byte (defaults to end of file)
        #[arg(long)]
        end: Option<u64>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Crawl outward from the seed artists and write the graph
    Crawl {
        /// Seed list (defaults to crawl.seed_path)
        #[arg(long)]
        seeds: Option<PathBuf>,

        #[arg(long)]
        max_depth: Option<usize>,

        #[arg(long)]
        max_articles: Option<usize>,

        /// Graph snapshot path (defaults to crawl.graph_path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Clear the classification cache first
        #[arg(long)]
        fresh: bool,
    },
}

fn init_logging(config: &Config, verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        LogLevel::Warn
    } else {
        config.logging.level.raised_by(verbose)
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wikigraph={}", level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = match config.logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::BuildIndex { index_file, output } => {
            commands::build_index(config, index_file, output, cli.quiet)
        }
        Commands::Locate { title, markup_out } => {
            commands::locate_article(config, title, markup_out)
        }
        Commands::Extract { start, end, output } => {
            commands::extract_range(config, start, end, output)
        }
        Commands::Crawl {
            seeds,
            max_depth,
            max_articles,
            output,
            fresh,
        } => commands::run_crawl(config, seeds, max_depth, max_articles, output, fresh),
    }
}
