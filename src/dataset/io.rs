use crate::dataset::types::Dataset;
use crate::error::{StoreError, StoreResult};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name fragments that mark a `.json` file as something other than the dataset.
pub const EXCLUDED_NAME_PARTS: [&str; 3] = ["backup", "discarded", "unsanitized"];

const INDENT: &[u8] = b"    ";

/// First `.json` file in `dir` (by name) that isn't a backup, ledger or
/// unsanitized dump. Not recursive.
pub fn locate_primary(dir: &Path) -> StoreResult<Option<PathBuf>> {
    let listing = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut candidates = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") && !EXCLUDED_NAME_PARTS.iter().any(|part| name.contains(part)) {
            candidates.push(name);
        }
    }
    // read_dir order is platform dependent
    candidates.sort();

    Ok(candidates.into_iter().next().map(|name| dir.join(name)))
}

/// `<stem>_backup.json` next to the primary file.
pub fn backup_path_for(primary: &Path) -> PathBuf {
    let stem = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    primary.with_file_name(format!("{}_backup.json", stem))
}

pub fn read_dataset(path: &Path) -> StoreResult<Dataset> {
    let raw = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&raw).map_err(|e| StoreError::json(path, e))
}

/// Like `read_dataset`, but a missing file reads as an empty dataset.
pub fn read_dataset_or_empty(path: &Path) -> StoreResult<Dataset> {
    if !path.exists() {
        return Ok(Dataset::new());
    }
    read_dataset(path)
}

/// Serializes with 4-space indentation, no trailing newline.
pub fn to_pretty_bytes<T: Serialize>(value: &T, path: &Path) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| StoreError::json(path, e))?;
    Ok(buf)
}

/// Rewrites the whole document at `path`.
///
/// Content goes to a temp file in the same directory which is then renamed
/// over the target, so readers see either the old or the new document. An
/// existing target keeps its permissions, and a symlink is followed so the
/// link itself survives.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = to_pretty_bytes(value, path)?;
    let target = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
    if let Ok(existing) = fs::metadata(&target) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(&target).map_err(|e| StoreError::io(&target, e.error))?;
    Ok(())
}

pub fn write_dataset(path: &Path, dataset: &Dataset) -> StoreResult<()> {
    write_document(path, dataset)
}
