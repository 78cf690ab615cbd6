use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// One timed piece of a clip's transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    // Fields we don't edit still travel with the segment (e.g. to the ledger).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            extra: Map::new(),
        }
    }
}

/// Transcription metadata for one audio clip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClipRecord {
    pub fn new(text: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            text: text.into(),
            segments,
            extra: Map::new(),
        }
    }
}

/// Clip key -> record mapping, kept in document order.
///
/// Lookups are linear; datasets are curated by hand and stay small enough
/// that a full rewrite per mutation is already the dominant cost.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    entries: Vec<(String, ClipRecord)>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClipRecord)> {
        self.entries.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ClipRecord> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ClipRecord> {
        self.position(key).map(move |i| &mut self.entries[i].1)
    }

    /// Entry at a zero-based position in document order.
    pub fn entry_at(&self, index: usize) -> Option<(&str, &ClipRecord)> {
        self.entries
            .get(index)
            .map(|(key, record)| (key.as_str(), record))
    }

    /// Inserts or replaces. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, record: ClipRecord) -> Option<ClipRecord> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, record)),
            None => {
                self.entries.push((key, record));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ClipRecord> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Merges `other` into `self`; keys already present are overwritten in place.
    pub fn merge(&mut self, other: Dataset) {
        for (key, record) in other.entries {
            self.insert(key, record);
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl FromIterator<(String, ClipRecord)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (String, ClipRecord)>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for (key, record) in iter {
            dataset.insert(key, record);
        }
        dataset
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = Dataset;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of clip keys to transcription records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dataset, A::Error> {
        let mut dataset = Dataset {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        // Duplicate keys: last value wins, first position is kept.
        while let Some((key, record)) = access.next_entry::<String, ClipRecord>()? {
            dataset.insert(key, record);
        }
        Ok(dataset)
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DatasetVisitor)
    }
}
