use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use crate::cache::{CacheDriver, FilesystemCache, DEFAULT_EXTENSION};
use crate::router::DispatchData;
use crate::runtime_config::DEFAULT_CACHE_DIR;

/// Command-line interface for the routekit route cache
#[derive(Debug, Parser)]
#[command(name = "routekit-cache")]
#[command(about = "Inspect and clear cached route tables", long_about = None)]
pub struct Cli {
    /// Cache directory
    #[arg(long, env = "ROUTEKIT_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    pub dir: PathBuf,

    /// File extension of cache entries
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available cache commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List cached entries
    List,
    /// Show the dispatch data stored under a key
    Inspect {
        /// Cache key, e.g. routekit.routes:3f2a9c0d1e4b5a67
        key: String,
    },
    /// Remove every cached entry
    Clear,
}

/// Run a parsed command, writing its report to `out`
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let cache = FilesystemCache::new(&cli.dir, &cli.extension);

    match &cli.command {
        Commands::List => {
            let keys = cache.keys()?;
            if keys.is_empty() {
                writeln!(out, "no cached route tables in {}", cli.dir.display())?;
            }
            for key in keys {
                let size = cache.fetch(&key)?.map_or(0, |bytes| bytes.len());
                writeln!(out, "{key}\t{size} bytes")?;
            }
        }
        Commands::Inspect { key } => {
            let Some(bytes) = cache.fetch(key)? else {
                bail!("no cache entry '{key}' in {}", cli.dir.display());
            };
            let data = DispatchData::from_bytes(&bytes)
                .with_context(|| format!("cache entry '{key}' is not valid dispatch data"))?;
            writeln!(out, "key:       {key}")?;
            writeln!(out, "generator: {}", data.generator)?;
            writeln!(out, "size:      {} bytes", bytes.len())?;
            writeln!(out, "{}", serde_json::to_string_pretty(&data.payload)?)?;
        }
        Commands::Clear => {
            let removed = cache.clear()?;
            writeln!(out, "removed {removed} cached route table(s)")?;
        }
    }
    Ok(())
}
