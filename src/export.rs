//! Per-day JSON export of crawl results.
//!
//! One file per section, grouped under a folder named for the run cutoff
//! date, the convention the downstream uploader keys on. Sections that
//! found no cards produce no file.

use crate::model::ListingRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a section's records under `<out_dir>/<YYYY-MM-DD>/<section>.json`
/// and return the file path.
pub fn write_section(
    out_dir: &Path,
    day: NaiveDate,
    section: &str,
    records: &[ListingRecord],
) -> Result<PathBuf> {
    let folder = out_dir.join(day.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&folder)
        .with_context(|| format!("failed to create export folder {}", folder.display()))?;

    let path = folder.join(format!("{section}.json"));
    let json = serde_json::to_string_pretty(records).context("failed to serialize records")?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(
        "wrote {} records for {section} to {}",
        records.len(),
        path.display()
    );
    Ok(path)
}
