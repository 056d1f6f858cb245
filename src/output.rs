//! Output serialization: the summary JSON map, the optional truncated
//! sample, and the unmatched-county CSV log.

use crate::domain::{SummaryRecord, UnmatchedEntry};
use crate::error::Result;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::info;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes the full `"{fips}_{job_title}"` → summary mapping as pretty JSON.
/// Entry order is group creation order.
pub fn write_summaries(path: &Path, summaries: &IndexMap<String, SummaryRecord>) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(summaries)?;
    fs::write(path, json)?;
    info!("💾 Wrote {} summary records to {}", summaries.len(), path.display());
    Ok(())
}

/// Writes the first `limit` entries of the mapping, in the same shape and
/// order as the full output.
pub fn write_sample(
    path: &Path,
    summaries: &IndexMap<String, SummaryRecord>,
    limit: usize,
) -> Result<()> {
    let sample: IndexMap<&String, &SummaryRecord> = summaries.iter().take(limit).collect();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(&sample)?;
    fs::write(path, json)?;
    info!("💾 Wrote {} sample records to {}", sample.len(), path.display());
    Ok(())
}

/// Writes the unmatched-county audit log with header `state,county,job_title`.
/// The header is written even when there are no entries.
pub fn write_unmatched(path: &Path, entries: &[UnmatchedEntry]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    // serialize() only emits the header once a record is written
    if entries.is_empty() {
        writer.write_record(["state", "county", "job_title"])?;
    }
    writer.flush()?;
    info!("💾 Wrote {} unmatched entries to {}", entries.len(), path.display());
    Ok(())
}
