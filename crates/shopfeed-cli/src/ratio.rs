//! `ratio` command handlers.

use std::sync::Arc;

use clap::Subcommand;
use shopfeed_core::AppConfig;
use shopfeed_feed::{AspectRatioCache, CacheSettings, HttpImageProbe};
use shopfeed_store::KvStore;

/// Sub-commands available under `ratio`.
#[derive(Debug, Subcommand)]
pub enum RatioCommands {
    /// Print the cached ratio for an image, without probing
    Get { url: String },
    /// Print the ratio for an image, probing it if not cached
    Fetch { url: String },
    /// Re-probe an image and overwrite its cached ratio
    Refresh { url: String },
    /// Probe and cache many images
    Warm {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Number of concurrent probes (defaults to SHOPFEED_WARM_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

fn print_ratio(url: &str, ratio: Option<f64>) {
    match ratio {
        Some(ratio) => println!("{url}\t{ratio:.4}"),
        None => println!("{url}\t-"),
    }
}

pub(crate) async fn run(
    config: &AppConfig,
    store: Arc<dyn KvStore>,
    command: RatioCommands,
) -> anyhow::Result<()> {
    let probe = HttpImageProbe::from_config(config)?;
    let cache = AspectRatioCache::new(store, Arc::new(probe), CacheSettings::from_config(config));

    match command {
        RatioCommands::Get { url } => print_ratio(&url, cache.get_cached_ratio(&url).await),
        RatioCommands::Fetch { url } => print_ratio(&url, cache.get_or_fetch_ratio(&url).await),
        RatioCommands::Refresh { url } => print_ratio(&url, cache.force_refresh(&url).await),
        RatioCommands::Warm { urls, concurrency } => {
            let concurrency = concurrency.unwrap_or(config.warm_concurrency);
            let cached = cache.warm_with(&urls, concurrency).await;
            println!("cached {cached} of {} image(s)", urls.len());
        }
    }
    Ok(())
}
