use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ruling::Ruling;

/// Root of the run's persisted state: batch output, watermark and the mounted
/// subscriber-group table all live under here.
pub fn storage_dir() -> PathBuf {
    std::env::var("SITUATION_ROOM_STORAGE_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("storage"))
}

pub fn posts_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join("posts.json")
}

pub fn groups_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join("mounted").join("groups.json")
}

pub fn load_rulings(path: &Path) -> Result<Vec<Ruling>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("batch output unreadable: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("batch output malformed: {}", path.display()))
}

pub fn save_rulings(path: &Path, rulings: &[Ruling]) -> Result<()> {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let json = serde_json::to_string_pretty(rulings).context("serialize batch output")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write batch output")?;
    fs::rename(&tmp, path).context("swap batch output")?;
    Ok(())
}

/// Full team name to external subscriber-group key.
pub fn load_groups(path: &Path) -> Result<HashMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("groups table unreadable: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("groups table malformed: {}", path.display()))
}
