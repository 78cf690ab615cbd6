use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_PAD_WIDTH: usize = 6;
pub const DEFAULT_SEGMENT_SLOTS: usize = 10;

/// How range-delete bounds are matched against clip keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeMatch {
    /// Padded number may appear anywhere in the key.
    Substring,
    /// Padded number must equal the key's leading run of digits.
    LeadingIndex,
}

impl Default for RangeMatch {
    fn default() -> Self {
        RangeMatch::Substring
    }
}

/// Per-session store configuration. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Zero-pad width for range-delete bounds. Bounds must fit in this many digits.
    pub pad_width: usize,
    /// How many segment-editing slots the UI renders.
    pub segment_slots: usize,
    pub audio_dir: String,
    pub discard_dir: String,
    pub discarded_audio_dir: String,
    pub ledger_file: String,
    pub range_match: RangeMatch,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pad_width: DEFAULT_PAD_WIDTH,
            segment_slots: DEFAULT_SEGMENT_SLOTS,
            audio_dir: "audio".to_string(),
            discard_dir: "Discarded".to_string(),
            discarded_audio_dir: "Discarded_Audios".to_string(),
            ledger_file: "discarded_entries.json".to_string(),
            range_match: RangeMatch::Substring,
        }
    }
}

impl StoreConfig {
    /// Defaults overlaid with `CLIP_CURATOR_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, but reads variables through `lookup`.
    /// Values that don't parse are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CLIP_CURATOR_PAD_WIDTH") {
            match raw.trim().parse::<usize>() {
                // u64 holds 19 decimal digits; anything wider can't be validated
                Ok(width) if (1..=18).contains(&width) => config.pad_width = width,
                _ => warn!("Ignoring CLIP_CURATOR_PAD_WIDTH={:?}", raw),
            }
        }

        if let Some(raw) = lookup("CLIP_CURATOR_SEGMENT_SLOTS") {
            match raw.trim().parse::<usize>() {
                Ok(slots) => config.segment_slots = slots,
                Err(_) => warn!("Ignoring CLIP_CURATOR_SEGMENT_SLOTS={:?}", raw),
            }
        }

        if let Some(raw) = lookup("CLIP_CURATOR_RANGE_MATCH") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "substring" => config.range_match = RangeMatch::Substring,
                "leading" | "leading_index" | "exact" => config.range_match = RangeMatch::LeadingIndex,
                _ => warn!("Ignoring CLIP_CURATOR_RANGE_MATCH={:?}", raw),
            }
        }

        config
    }

    /// Largest bound accepted for a range delete (`10^pad_width - 1`).
    pub fn max_range_bound(&self) -> u64 {
        10u64
            .checked_pow(self.pad_width as u32)
            .map(|limit| limit - 1)
            .unwrap_or(u64::MAX)
    }
}
