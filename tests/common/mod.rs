#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DATASET_FILE: &str = "clips.json";

/// A dataset folder with `clips.json` and one audio file per key.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(doc: &Value) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(DATASET_FILE), serde_json::to_vec_pretty(doc).unwrap()).unwrap();

        let audio = dir.path().join("audio");
        fs::create_dir_all(&audio).unwrap();
        for key in doc.as_object().expect("object document").keys() {
            fs::write(audio.join(key), format!("RIFF-{}", key)).unwrap();
        }
        Self { dir }
    }

    /// `count` clips keyed `000001_clip` .. with two segments each.
    pub fn with_clips(count: usize) -> Self {
        Self::new(&clips_doc(count))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn primary(&self) -> PathBuf {
        self.path().join(DATASET_FILE)
    }

    pub fn ledger(&self) -> PathBuf {
        self.path().join("Discarded").join("discarded_entries.json")
    }

    pub fn quarantine(&self) -> PathBuf {
        self.path().join("Discarded").join("Discarded_Audios")
    }

    pub fn read_primary(&self) -> Value {
        read_json(&self.primary())
    }

    pub fn read_ledger(&self) -> Value {
        if self.ledger().exists() {
            read_json(&self.ledger())
        } else {
            json!({})
        }
    }
}

pub fn clip_key(n: usize) -> String {
    format!("{:06}_clip", n)
}

pub fn record(text: &str, segments: &[(&str, f64, f64)]) -> Value {
    let segments: Vec<Value> = segments
        .iter()
        .map(|(t, s, e)| json!({ "text": t, "start": s, "end": e }))
        .collect();
    json!({ "text": text, "segments": segments })
}

pub fn clips_doc(count: usize) -> Value {
    let mut doc = serde_json::Map::new();
    for n in 1..=count {
        doc.insert(
            clip_key(n),
            record(
                &format!("clip number {}", n),
                &[("first half", 0.0, 1.5), ("second half", 1.5, 3.0)],
            ),
        );
    }
    Value::Object(doc)
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

pub fn len_of(doc: &Value) -> usize {
    doc.as_object().map(|m| m.len()).unwrap_or(0)
}
