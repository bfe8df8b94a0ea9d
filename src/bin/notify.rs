use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use situation_room::notify::{PushoverSink, run_notifier};
use situation_room::store;
use situation_room::tracker;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let storage = store::storage_dir();
    let watermark_path = tracker::watermark_path(&storage);
    let watermark = tracker::load_watermark(&watermark_path)?;
    let groups = store::load_groups(&store::groups_path(&storage))?;
    let rulings = store::load_rulings(&store::posts_path(&storage))?;

    let sink = PushoverSink::from_env()?;
    let sent = run_notifier(&rulings, &watermark, &groups, &sink);
    info!(sent, total = rulings.len(), "notification pass complete");

    // The watermark only advances here, after fan-out, so a failed run stays
    // safely re-runnable and never double-notifies.
    if let Some(newest) = rulings.first() {
        tracker::save_watermark(&watermark_path, &newest.url)?;
        info!(watermark = %newest.url, "watermark advanced");
    }
    Ok(())
}
