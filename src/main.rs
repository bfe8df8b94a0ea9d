use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use situation_room::batch::run_batch;
use situation_room::fetch::{FeedSource, HttpFeedSource};
use situation_room::listing::parse_listing;
use situation_room::store;
use situation_room::tracker::{self, select_new};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let storage = store::storage_dir();
    let watermark = tracker::load_watermark(&tracker::watermark_path(&storage))?;

    let feed = HttpFeedSource::from_env();
    let listing_html = feed.listing_html().context("feed listing fetch failed")?;
    let entries = parse_listing(&listing_html)?;
    info!(fetched = entries.len(), "listing parsed");

    let new_entries = select_new(entries, &watermark);
    info!(
        new = new_entries.len(),
        watermark = watermark.as_str(),
        "selected entries past the watermark"
    );

    let outcome = run_batch(&feed, &new_entries);
    info!(
        kept = outcome.rulings.len(),
        dropped = outcome.failures.len(),
        "batch complete"
    );

    if outcome.rulings.is_empty() {
        info!("no new rulings; batch output and watermark left untouched");
        return Ok(());
    }

    let posts_path = store::posts_path(&storage);
    store::save_rulings(&posts_path, &outcome.rulings)?;
    info!(path = %posts_path.display(), "batch output written");
    Ok(())
}
