use crate::config::StoreConfig;
use crate::dataset::{locate_primary, read_dataset, write_dataset, ClipRecord, Dataset};
use crate::error::{StoreError, StoreResult};
use crate::store::projection::{project, Projection, RangeFields};
use crate::store::quarantine::{
    append_to_ledger, clear_marker, quarantine_audio, recover_pending, write_marker,
};
use crate::store::range::resolve_range;
use crate::store::session::{DatasetLayout, Session};
use serde_json::Number;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub const SAVED_MESSAGE: &str = "The JSON was saved.";
pub const LAST_ENTRY_MESSAGE: &str = "Cannot delete the last audio of the dataset.";
pub const NOTHING_TO_DELETE_MESSAGE: &str = "There are no audios to be deleted.";

/// Edited values for one existing segment, as typed into the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentEdit {
    pub text: String,
    pub start: String,
    pub end: String,
}

impl SegmentEdit {
    pub fn new(text: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Groups a flat `text, start, end, text, start, end, ...` field list.
    ///
    /// Empty values are dropped first (hidden slots render as empty), so a
    /// blank field inside a visible slot shifts every later triple. Prefer
    /// building `SegmentEdit`s directly.
    pub fn from_flat<S: AsRef<str>>(values: &[S]) -> Vec<SegmentEdit> {
        let cleaned: Vec<&str> = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !v.is_empty())
            .collect();

        cleaned
            .chunks(3)
            .map(|triple| SegmentEdit {
                text: triple.first().copied().unwrap_or_default().to_string(),
                start: triple.get(1).copied().unwrap_or_default().to_string(),
                end: triple.get(2).copied().unwrap_or_default().to_string(),
            })
            .collect()
    }
}

/// Where pagination should go relative to the page on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    Stay,
    /// Relative step, e.g. +1 / -1.
    Step(i64),
    /// Absolute zero-based index.
    To(i64),
}

/// The curation core. Holds configuration only; all session state lives in
/// the `Session` passed to each call.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    config: StoreConfig,
}

impl DatasetStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Opens the dataset in `dir`, snapshots it to `<name>_backup.json` and
    /// shows the first clip.
    ///
    /// The backup is rewritten on every load: it is always the state at the
    /// start of the current session. A delete left half-done by a crash is
    /// finished here before anything is shown.
    pub fn load_and_init(&self, dir: &Path) -> StoreResult<(Session, Projection)> {
        let primary = locate_primary(dir)?.ok_or_else(|| StoreError::NoPrimaryFile(dir.to_path_buf()))?;
        let layout = DatasetLayout::new(dir, primary, &self.config);

        fs::copy(&layout.primary, &layout.backup).map_err(|e| StoreError::io(&layout.backup, e))?;
        info!("Backup written to {}", layout.backup.display());

        let dataset = read_dataset(&layout.primary)?;
        info!("Loaded {} clips from {}", dataset.len(), layout.primary.display());

        if let Some(report) = recover_pending(&layout, &dataset)? {
            info!(
                "Recovered pending delete: {} moved, {} failed",
                report.moved.len(),
                report.failed.len()
            );
        }

        let mut session = Session::new(layout, dataset);
        let projection = self.render(&mut session, 0, None, RangeFields::none());
        Ok((session, projection))
    }

    /// Re-renders the clip under the cursor.
    pub fn refresh(&self, session: &mut Session, message: Option<String>) -> Projection {
        let index = session.cursor as i64;
        self.render(session, index, message, RangeFields::none())
    }

    /// Deletes the clips numbered `start..=end` (as typed into the UI).
    ///
    /// Invalid or unresolvable bounds leave everything untouched and come
    /// back as the projection's message. `page` is the 1-based page shown.
    pub fn delete_multiple(
        &self,
        session: &mut Session,
        page: usize,
        start: &str,
        end: &str,
    ) -> StoreResult<Projection> {
        // The range fields clear after this call whatever the outcome.
        session.clear_sticky_fields();

        match resolve_range(&session.dataset, start, end, &self.config) {
            Ok(keys) => self.delete_entries(session, page, &keys),
            Err(e) => {
                debug!("Range delete {:?}..{:?} refused: {}", start, end, e);
                Ok(self.render(session, page_index(page), Some(e.to_string()), RangeFields::none()))
            }
        }
    }

    /// Removes `keys` from the dataset.
    ///
    /// Records go to the discard ledger and their audio files to the
    /// discarded-audio folder; nothing is erased. A batch that would leave
    /// the dataset empty is refused. Keys not in the dataset are skipped.
    pub fn delete_entries(
        &self,
        session: &mut Session,
        page: usize,
        keys: &[String],
    ) -> StoreResult<Projection> {
        session.clear_sticky_fields();
        let index = page_index(page);

        let keys = dedup(keys);
        if keys.is_empty() {
            return Ok(self.render(session, index, Some(NOTHING_TO_DELETE_MESSAGE.to_string()), RangeFields::none()));
        }

        // Pick up any edits made to the file since load.
        let mut dataset = read_dataset(&session.layout.primary)?;

        let present: Vec<String> = keys
            .iter()
            .filter(|key| dataset.contains_key(key))
            .cloned()
            .collect();
        if present.is_empty() {
            warn!("None of {} found in JSON data", keys.join(", "));
            session.dataset = dataset;
            return Ok(self.render(session, index, Some(NOTHING_TO_DELETE_MESSAGE.to_string()), RangeFields::none()));
        }
        if dataset.len() <= present.len() {
            session.dataset = dataset;
            return Ok(self.render(session, index, Some(LAST_ENTRY_MESSAGE.to_string()), RangeFields::none()));
        }

        let mut discarded = Dataset::new();
        for key in &keys {
            match dataset.remove(key) {
                Some(record) => {
                    discarded.insert(key.clone(), record);
                }
                None => warn!("Audio name {} not found in JSON data", key),
            }
        }

        // From here until the marker is cleared, a crash is finished on next load.
        let marker = write_marker(&session.layout, &discarded)?;
        write_dataset(&session.layout.primary, &dataset)?;
        session.dataset = dataset;
        append_to_ledger(&session.layout, discarded)?;

        let report = quarantine_audio(&session.layout, &present)?;
        clear_marker(&session.layout)?;
        info!(
            "Delete {} done: {} record(s), {} audio file(s) moved, {} failed",
            marker.id,
            present.len(),
            report.moved.len(),
            report.failed.len()
        );

        let names = present.join(", ");
        let message = if present.len() == 1 {
            format!("{} was successfully deleted from the dataset.", names)
        } else {
            format!("{} were successfully deleted from the dataset.", names)
        };

        Ok(self.render(session, index, Some(message), RangeFields::none()))
    }

    /// Writes new transcript text and segment values for `key`.
    ///
    /// Only segments the record already has are rewritten, in order. A
    /// segment whose start or end doesn't parse as a number keeps its old
    /// values; the rest of the save goes ahead. The cursor doesn't move.
    pub fn save(
        &self,
        session: &mut Session,
        key: &str,
        text: &str,
        edits: &[SegmentEdit],
    ) -> StoreResult<String> {
        let mut dataset = read_dataset(&session.layout.primary)?;

        if !dataset.contains_key(key) {
            warn!("Save skipped: {} not found in JSON data", key);
            session.dataset = dataset;
            return Ok(format!("{} was not found in the dataset; nothing was saved.", key));
        }
        if let Some(record) = dataset.get_mut(key) {
            apply_edits(record, key, text, edits);
        }

        write_dataset(&session.layout.primary, &dataset)?;
        session.dataset = dataset;
        debug!("Saved {}", key);
        Ok(SAVED_MESSAGE.to_string())
    }

    /// Moves between clips. `page` is the 1-based page on screen.
    ///
    /// The range-delete fields stay put while they hold text. A move that
    /// would leave the dataset re-renders the current page instead.
    pub fn paginate(
        &self,
        session: &mut Session,
        page: usize,
        fields: RangeFields,
        step: PageMove,
    ) -> Projection {
        let current = page_index(page);
        // None when the step overflows, which is just another out-of-bounds move.
        let target = match step {
            PageMove::Stay => Some(current),
            PageMove::Step(delta) => current.checked_add(delta),
            PageMove::To(index) => Some(index),
        };

        session.keep_range_start = fields.start.as_deref().is_some_and(|s| !s.is_empty());
        session.keep_range_end = fields.end.as_deref().is_some_and(|s| !s.is_empty());

        let index = match target {
            Some(target) if target >= 0 && (target as usize) < session.dataset.len() => target,
            _ => current,
        };
        self.render(session, index, None, fields)
    }

    fn render(
        &self,
        session: &mut Session,
        index: i64,
        message: Option<String>,
        fields: RangeFields,
    ) -> Projection {
        project(session, index, message, fields, self.config.segment_slots)
    }
}

fn apply_edits(record: &mut ClipRecord, key: &str, text: &str, edits: &[SegmentEdit]) {
    record.text = text.to_string();

    // Existing segments only; extra edits are ignored.
    for (i, segment) in record.segments.iter_mut().enumerate() {
        let Some(edit) = edits.get(i) else {
            break;
        };

        let (start, end) = match (parse_seconds(&edit.start), parse_seconds(&edit.end)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!(
                    "Error converting time values to float for {} segment {}: start={:?} end={:?}",
                    key,
                    i + 1,
                    edit.start,
                    edit.end
                );
                continue;
            }
        };

        segment.text = edit.text.clone();
        segment.start = start;
        segment.end = end;
    }
}

/// 1-based page to zero-based index.
fn page_index(page: usize) -> i64 {
    page as i64 - 1
}

/// Finite number or nothing; JSON can't hold NaN or infinity.
fn parse_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| Number::from_f64(*v).is_some())
}

fn dedup(keys: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keys.iter()
        .filter(|key| seen.insert(key.as_str()))
        .cloned()
        .collect()
}
