mod feed;
mod interest;
mod ratio;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use shopfeed_store::{FileStore, KvStore};
use tracing_subscriber::EnvFilter;

use crate::interest::InterestCommands;
use crate::ratio::RatioCommands;

#[derive(Debug, Parser)]
#[command(name = "shopfeed")]
#[command(about = "Shopping feed pipeline tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the feed for a catalog and print the ordered cards as JSON
    Feed {
        /// Read the catalog from a local JSON file
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
        /// Fetch the catalog over HTTP (defaults to SHOPFEED_CATALOG_URL)
        #[arg(long)]
        url: Option<String>,
        /// Number of interest categories to promote
        #[arg(long)]
        top_k: Option<usize>,
        /// Minimum interaction count for a category to be promoted
        #[arg(long)]
        threshold: Option<u64>,
    },
    /// Inspect or update the persisted category interest document
    Interest {
        #[command(subcommand)]
        command: InterestCommands,
    },
    /// Inspect or populate the image aspect-ratio cache
    Ratio {
        #[command(subcommand)]
        command: RatioCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = shopfeed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(env = %config.env, store_dir = %config.store_dir.display(), "starting");
    let store: Arc<dyn KvStore> = Arc::new(FileStore::new(&config.store_dir));

    match cli.command {
        Commands::Feed {
            file,
            url,
            top_k,
            threshold,
        } => {
            let source = feed::CatalogSource::resolve(file, url, config.catalog_url.as_deref())?;
            feed::run_feed(&config, store, &source, top_k, threshold).await?;
        }
        Commands::Interest { command } => interest::run(&config, store, command).await?,
        Commands::Ratio { command } => ratio::run(&config, store, command).await?,
    }

    Ok(())
}
