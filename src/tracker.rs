use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::listing::ListingEntry;

/// Sentinel stored before the first successful run. Parsing still happens on a
/// sentinel run, but notifications are suppressed to avoid a storm from the
/// historical backlog.
pub const NEVER_UPDATED: &str = "NEVER_UPDATED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watermark {
    NeverUpdated,
    Url(String),
}

impl Watermark {
    pub fn from_raw(raw: &str) -> Watermark {
        if raw == NEVER_UPDATED {
            Watermark::NeverUpdated
        } else {
            Watermark::Url(raw.to_string())
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            Watermark::NeverUpdated => false,
            Watermark::Url(last) => last == url,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Watermark::NeverUpdated => NEVER_UPDATED,
            Watermark::Url(url) => url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WatermarkFile {
    last_update: String,
}

pub fn watermark_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join("last_update.json")
}

/// Read the persisted watermark. An unreadable store is fatal to the run:
/// there is no safe default short of an explicit `NEVER_UPDATED` baseline.
pub fn load_watermark(path: &Path) -> Result<Watermark> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("watermark store unreadable: {}", path.display()))?;
    let file: WatermarkFile = serde_json::from_str(&raw)
        .with_context(|| format!("watermark store malformed: {}", path.display()))?;
    Ok(Watermark::from_raw(&file.last_update))
}

pub fn save_watermark(path: &Path, url: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let json = serde_json::to_string(&WatermarkFile {
        last_update: url.to_string(),
    })
    .context("serialize watermark")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write watermark")?;
    fs::rename(&tmp, path).context("swap watermark")?;
    Ok(())
}

/// Keep the newest-first prefix of the listing that precedes the watermark
/// entry; the matching entry and everything after it have been seen already.
/// On a `NeverUpdated` baseline every entry is new.
pub fn select_new(entries: Vec<ListingEntry>, watermark: &Watermark) -> Vec<ListingEntry> {
    entries
        .into_iter()
        .take_while(|entry| !watermark.matches(&entry.article_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{NEVER_UPDATED, Watermark, select_new};
    use crate::listing::ListingEntry;

    fn entries() -> Vec<ListingEntry> {
        ["/news/a", "/news/b", "/news/c", "/news/d"]
            .iter()
            .map(|url| ListingEntry::new("Goal Review: TOR @ MTL-Good Call", url))
            .collect()
    }

    #[test]
    fn stops_at_watermark_exclusive() {
        let kept = select_new(entries(), &Watermark::Url("/news/b".into()));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].article_url, "/news/a");
    }

    #[test]
    fn never_updated_keeps_everything() {
        let kept = select_new(entries(), &Watermark::NeverUpdated);
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn unknown_watermark_keeps_everything() {
        let kept = select_new(entries(), &Watermark::Url("/news/zzz".into()));
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn sentinel_round_trips_through_raw_form() {
        let wm = Watermark::from_raw(NEVER_UPDATED);
        assert_eq!(wm, Watermark::NeverUpdated);
        assert_eq!(wm.as_str(), NEVER_UPDATED);
        assert!(!wm.matches("/news/a"));
    }
}
