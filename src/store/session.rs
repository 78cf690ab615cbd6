use crate::config::StoreConfig;
use crate::dataset::{backup_path_for, Dataset};
use std::path::{Path, PathBuf};

pub const PENDING_DELETE_FILE: &str = "pending_delete.json";

/// Every path a session touches, resolved once at load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub primary: PathBuf,
    pub backup: PathBuf,
    pub audio_dir: PathBuf,
    pub discard_dir: PathBuf,
    pub discarded_audio_dir: PathBuf,
    pub ledger: PathBuf,
    pub pending_marker: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: &Path, primary: PathBuf, config: &StoreConfig) -> Self {
        let discard_dir = root.join(&config.discard_dir);
        Self {
            root: root.to_path_buf(),
            backup: backup_path_for(&primary),
            primary,
            audio_dir: root.join(&config.audio_dir),
            discarded_audio_dir: discard_dir.join(&config.discarded_audio_dir),
            ledger: discard_dir.join(&config.ledger_file),
            pending_marker: discard_dir.join(PENDING_DELETE_FILE),
            discard_dir,
        }
    }

    pub fn audio_path(&self, key: &str) -> PathBuf {
        self.audio_dir.join(key)
    }
}

/// State of one curation session.
///
/// Owned by the caller and handed to every `DatasetStore` operation, so
/// several sessions can coexist and tests need no shared fixtures.
#[derive(Debug, Clone)]
pub struct Session {
    pub layout: DatasetLayout,
    pub dataset: Dataset,
    /// Zero-based position of the clip on screen.
    pub cursor: usize,
    /// Keep the range-delete "start" field on the next render.
    pub keep_range_start: bool,
    /// Keep the range-delete "end" field on the next render.
    pub keep_range_end: bool,
}

impl Session {
    pub fn new(layout: DatasetLayout, dataset: Dataset) -> Self {
        Self {
            layout,
            dataset,
            cursor: 0,
            keep_range_start: false,
            keep_range_end: false,
        }
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Key under the cursor, if the dataset isn't empty.
    pub fn current_key(&self) -> Option<&str> {
        self.dataset.entry_at(self.cursor).map(|(key, _)| key)
    }

    pub(crate) fn clear_sticky_fields(&mut self) {
        self.keep_range_start = false;
        self.keep_range_end = false;
    }
}
