use crate::dataset::Segment;
use crate::store::session::Session;
use serde::Serialize;
use std::path::PathBuf;

pub const EMPTY_CLIP_MESSAGE: &str = "There are no segments or text available for this audio.";
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Check whether your JSON file is empty.";
pub const FALLBACK_PAGE_LABEL: &str = "Audio not available";

/// One segment-editing position on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SegmentSlot {
    pub visible: bool,
    pub text: String,
    pub start: String,
    pub end: String,
}

impl SegmentSlot {
    pub fn hidden() -> Self {
        Self::default()
    }

    fn showing(segment: &Segment) -> Self {
        Self {
            visible: true,
            text: segment.text.clone(),
            start: format_seconds(segment.start),
            end: format_seconds(segment.end),
        }
    }
}

/// What the UI should do with its segment slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SlotUpdate {
    /// Replace every slot (always exactly `segment_slots` entries).
    Replace(Vec<SegmentSlot>),
    /// Leave whatever the UI currently shows.
    Unchanged,
}

impl SlotUpdate {
    pub fn slots(&self) -> Option<&[SegmentSlot]> {
        match self {
            SlotUpdate::Replace(slots) => Some(slots),
            SlotUpdate::Unchanged => None,
        }
    }
}

/// Post-operation view of the session, in the order the UI renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub audio_path: Option<PathBuf>,
    pub audio_name: String,
    /// 1-based.
    pub page: usize,
    pub page_label: String,
    pub text: String,
    pub message: String,
    /// `None` leaves the range-delete start field as the UI has it.
    pub range_start: Option<String>,
    /// `None` leaves the range-delete end field as the UI has it.
    pub range_end: Option<String>,
    pub segments: SlotUpdate,
}

/// Range-delete field values handed back to the UI untouched when sticky.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeFields {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeFields {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

/// Renders the clip at `index` and moves the session cursor there.
///
/// The index is clamped into the dataset; an empty dataset yields the
/// fallback view, which keeps the cursor and the UI's slots as they are.
pub fn project(
    session: &mut Session,
    index: i64,
    message: Option<String>,
    fields: RangeFields,
    slot_capacity: usize,
) -> Projection {
    let range_start = if session.keep_range_start { fields.start } else { Some(String::new()) };
    let range_end = if session.keep_range_end { fields.end } else { Some(String::new()) };

    let count = session.dataset.len();
    if count == 0 {
        return fallback(range_start, range_end);
    }

    let clamped = index.clamp(0, count as i64 - 1) as usize;
    let Some((key, record)) = session.dataset.entry_at(clamped) else {
        return fallback(range_start, range_end);
    };
    let audio_path = Some(session.layout.audio_path(key));
    let audio_name = display_name(key);
    let page_label = format!("Current Audio: {}/{}", clamped + 1, count);

    let (message, segments) = if record.text.is_empty() {
        // Blank transcript: nothing to edit, even if segments exist.
        (EMPTY_CLIP_MESSAGE.to_string(), hidden_slots(slot_capacity))
    } else {
        (message.unwrap_or_default(), segment_slots(&record.segments, slot_capacity))
    };

    let projection = Projection {
        audio_path,
        audio_name,
        page: clamped + 1,
        page_label,
        text: record.text.clone(),
        message,
        range_start,
        range_end,
        segments,
    };
    session.cursor = clamped;
    projection
}

fn fallback(range_start: Option<String>, range_end: Option<String>) -> Projection {
    Projection {
        audio_path: None,
        audio_name: String::new(),
        page: 1,
        page_label: FALLBACK_PAGE_LABEL.to_string(),
        text: String::new(),
        message: FALLBACK_MESSAGE.to_string(),
        range_start,
        range_end,
        segments: SlotUpdate::Unchanged,
    }
}

fn segment_slots(segments: &[Segment], capacity: usize) -> SlotUpdate {
    let slots = (0..capacity)
        .map(|i| match segments.get(i) {
            Some(segment) => SegmentSlot::showing(segment),
            None => SegmentSlot::hidden(),
        })
        .collect();
    SlotUpdate::Replace(slots)
}

fn hidden_slots(capacity: usize) -> SlotUpdate {
    SlotUpdate::Replace(vec![SegmentSlot::hidden(); capacity])
}

/// Last path component of a clip key.
fn display_name(key: &str) -> String {
    key.rsplit(['/', '\\']).next().unwrap_or(key).to_string()
}

/// Seconds as JSON prints them (`2.0`, not `2`).
pub fn format_seconds(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|n| n.to_string())
        .unwrap_or_else(|| value.to_string())
}
