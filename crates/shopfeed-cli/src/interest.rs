//! `interest` command handlers.

use std::sync::Arc;

use clap::Subcommand;
use shopfeed_core::AppConfig;
use shopfeed_feed::InterestTracker;
use shopfeed_store::KvStore;

/// Sub-commands available under `interest`.
#[derive(Debug, Subcommand)]
pub enum InterestCommands {
    /// Count one interaction with a category
    Record {
        category: String,
        /// Interaction time in epoch milliseconds (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// Print every record and the categories that would be promoted
    Show,
    /// Erase all interest data
    Clear,
}

pub(crate) async fn run(
    config: &AppConfig,
    store: Arc<dyn KvStore>,
    command: InterestCommands,
) -> anyhow::Result<()> {
    let tracker = InterestTracker::new(store);

    match command {
        InterestCommands::Record { category, at } => {
            tracker.record_interest(&category, at).await;
            println!("recorded interaction with '{}'", category.trim());
        }
        InterestCommands::Show => {
            let document = tracker.load().await;
            if document.is_empty() {
                println!("no interest recorded");
                return Ok(());
            }
            for (category, record) in document.iter() {
                println!(
                    "{category:<24} count={:<6} last={}",
                    record.count, record.timestamp
                );
            }
            let promoted =
                document.top_categories(config.interest_threshold, config.interest_top_k);
            println!("promoted: {}", promoted.join(", "));
        }
        InterestCommands::Clear => {
            tracker.clear().await;
            println!("interest data cleared");
        }
    }
    Ok(())
}
