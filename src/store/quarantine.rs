//! Move-not-erase bookkeeping for deleted clips.
//!
//! A batch delete is two steps that can't be made atomic together: the
//! dataset rewrite (records go to the discard ledger) and the audio move
//! (files go to the discarded-audio folder). A pending-delete marker holding
//! the removed records is written before the first step and removed after
//! the second, so a crash anywhere in between leaves enough behind for the
//! next load to finish both the ledger merge and the move.

use crate::dataset::{read_dataset_or_empty, write_dataset, write_document, Dataset};
use crate::error::{StoreError, StoreResult};
use crate::store::session::DatasetLayout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDelete {
    pub id: Uuid,
    pub keys: Vec<String>,
    pub records: Dataset,
}

/// Outcome of moving audio files into quarantine.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuarantineReport {
    pub moved: Vec<String>,
    /// (file name, error) for each file that stayed behind.
    pub failed: Vec<(String, String)>,
}

pub fn write_marker(layout: &DatasetLayout, removed: &Dataset) -> StoreResult<PendingDelete> {
    ensure_dir(&layout.discard_dir)?;
    let marker = PendingDelete {
        id: Uuid::new_v4(),
        keys: removed.keys().map(str::to_string).collect(),
        records: removed.clone(),
    };
    write_document(&layout.pending_marker, &marker)?;
    debug!("Pending delete {} written for {} key(s)", marker.id, marker.keys.len());
    Ok(marker)
}

pub fn read_marker(layout: &DatasetLayout) -> StoreResult<Option<PendingDelete>> {
    let path = &layout.pending_marker;
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let marker = serde_json::from_slice(&raw).map_err(|e| StoreError::json(path, e))?;
    Ok(Some(marker))
}

pub fn clear_marker(layout: &DatasetLayout) -> StoreResult<()> {
    match fs::remove_file(&layout.pending_marker) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(&layout.pending_marker, e)),
    }
}

/// Merges removed records into the discard ledger, creating it if needed.
/// Existing entries are never dropped; a re-discarded key is overwritten.
pub fn append_to_ledger(layout: &DatasetLayout, discarded: Dataset) -> StoreResult<()> {
    if discarded.is_empty() {
        return Ok(());
    }
    ensure_dir(&layout.discard_dir)?;

    let mut ledger = read_dataset_or_empty(&layout.ledger)?;
    let added = discarded.len();
    ledger.merge(discarded);
    write_dataset(&layout.ledger, &ledger)?;

    info!("Discard ledger now holds {} entries (+{})", ledger.len(), added);
    Ok(())
}

/// Moves every file in the audio folder whose name is one of `keys` into
/// the discarded-audio folder. One failed move doesn't stop the rest.
pub fn quarantine_audio(layout: &DatasetLayout, keys: &[String]) -> StoreResult<QuarantineReport> {
    let mut report = QuarantineReport::default();
    if keys.is_empty() {
        return Ok(report);
    }
    ensure_dir(&layout.discarded_audio_dir)?;

    let listing = match fs::read_dir(&layout.audio_dir) {
        Ok(listing) => listing,
        Err(e) => {
            warn!("Audio folder {} unreadable: {}", layout.audio_dir.display(), e);
            return Ok(report);
        }
    };

    let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
    for entry in listing.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !wanted.contains(name.as_str()) {
            continue;
        }

        let src = entry.path();
        let dst = layout.discarded_audio_dir.join(&name);
        match move_file(&src, &dst) {
            Ok(()) => report.moved.push(name),
            Err(e) => {
                warn!("Error moving {} to {}: {}", src.display(), dst.display(), e);
                report.failed.push((name, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Finishes a delete interrupted by a crash.
///
/// Only keys already gone from `dataset` are handled; a key still present
/// means the crash came before the dataset rewrite, so nothing happened to
/// it. For the rest, the saved records are merged into the ledger (merging
/// twice is harmless) and the audio is moved.
pub fn recover_pending(
    layout: &DatasetLayout,
    dataset: &Dataset,
) -> StoreResult<Option<QuarantineReport>> {
    let Some(marker) = read_marker(layout)? else {
        return Ok(None);
    };

    let keys: Vec<String> = marker
        .keys
        .into_iter()
        .filter(|key| !dataset.contains_key(key))
        .collect();
    info!("Resuming interrupted delete {} ({} key(s))", marker.id, keys.len());

    let records: Dataset = marker
        .records
        .iter()
        .filter(|(key, _)| keys.iter().any(|k| k.as_str() == *key))
        .map(|(key, record)| (key.to_string(), record.clone()))
        .collect();
    append_to_ledger(layout, records)?;

    let report = quarantine_audio(layout, &keys)?;
    clear_marker(layout)?;
    Ok(Some(report))
}

fn ensure_dir(dir: &Path) -> StoreResult<()> {
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!("rename {} failed ({}), copying instead", src.display(), rename_err);
            fs::copy(src, dst)?;
            fs::remove_file(src)
        }
    }
}
