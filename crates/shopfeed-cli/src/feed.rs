//! `feed` command: load a catalog, expand, rerank, and print the cards.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use shopfeed_catalog::{parse_catalog, CatalogClient};
use shopfeed_core::{AppConfig, Product};
use shopfeed_feed::{FeedPipeline, InterestTracker, ReorderOptions};
use shopfeed_store::KvStore;

/// Where the catalog JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Picks `--file`, then `--url`, then the configured catalog URL.
    pub(crate) fn resolve(
        file: Option<PathBuf>,
        url: Option<String>,
        configured_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        match (file, url, configured_url) {
            (Some(path), _, _) => Ok(Self::File(path)),
            (None, Some(url), _) => Ok(Self::Url(url)),
            (None, None, Some(url)) => Ok(Self::Url(url.to_owned())),
            (None, None, None) => {
                anyhow::bail!("no catalog given; pass --file or --url, or set SHOPFEED_CATALOG_URL")
            }
        }
    }

    async fn load(&self, config: &AppConfig) -> anyhow::Result<Vec<Product>> {
        match self {
            Self::File(path) => {
                let body = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading catalog file {}", path.display()))?;
                Ok(parse_catalog(&body)?)
            }
            Self::Url(url) => {
                let client = CatalogClient::from_config(config)?;
                Ok(client.fetch_products(url).await?)
            }
        }
    }
}

pub(crate) async fn run_feed(
    config: &AppConfig,
    store: Arc<dyn KvStore>,
    source: &CatalogSource,
    top_k: Option<usize>,
    threshold: Option<u64>,
) -> anyhow::Result<()> {
    let products = source.load(config).await?;

    let defaults = ReorderOptions::from_config(config);
    let options = ReorderOptions {
        top_k: top_k.unwrap_or(defaults.top_k),
        threshold: threshold.unwrap_or(defaults.threshold),
    };
    let pipeline = FeedPipeline::new(InterestTracker::new(store), options);
    let build = pipeline.build(&products).await;

    tracing::info!(
        products = products.len(),
        cards = build.cards.len(),
        "feed built"
    );
    println!("{}", serde_json::to_string_pretty(&build.cards)?);
    Ok(())
}
