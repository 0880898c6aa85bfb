//! JSON collection storage with crash-safe replace semantics.
//!
//! Reads are forgiving: anything that is not a readable JSON array is an
//! empty collection. Writes are strict: content is staged into a temporary
//! file next to the destination and renamed over it, so a reader sees either
//! the old file or the new one, never a torn write. Write failures are
//! returned to the caller.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::models::QuoteRecord;

/// Load the collection at `path`.
///
/// Missing, unreadable, or malformed files yield an empty collection.
/// Array entries that are not JSON objects are skipped. Object entries are
/// always kept: mistyped known fields fall back to defaults and a missing
/// `hash` is recomputed from the text.
pub fn read_collection(path: &Path) -> Vec<QuoteRecord> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to read collection, starting fresh");
            }
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(path = %path.display(), "collection is not a JSON array, starting fresh");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "collection is not valid JSON, starting fresh");
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            warn!(index, "skipping non-object collection entry");
            continue;
        }
        match serde_json::from_value::<QuoteRecord>(entry) {
            Ok(mut record) => {
                if record.repair_hash() {
                    warn!(index, id = %record.id, "collection entry had no hash, recomputed");
                }
                records.push(record);
            }
            Err(e) => warn!(index, error = %e, "skipping unreadable collection entry"),
        }
    }
    records
}

/// Serialize a collection the way it is stored on disk: two-space
/// indentation, trailing newline.
pub fn render_collection(records: &[QuoteRecord]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    Ok(json)
}

/// Atomically replace the collection at `path`.
pub fn write_collection(path: &Path, records: &[QuoteRecord]) -> Result<()> {
    let content = render_collection(records)?;
    StagedWrite::stage(path, content.as_bytes())?.commit()
}

/// Write the same collection to a secondary location for publishing.
///
/// Callers must only mirror after the primary write succeeded.
pub fn mirror(records: &[QuoteRecord], secondary: &Path) -> Result<()> {
    write_collection(secondary, records)
        .with_context(|| format!("Failed to mirror collection to {}", secondary.display()))
}

/// Write the primary collection, then mirror it if a mirror path is set.
pub fn publish(primary: &Path, secondary: Option<&Path>, records: &[QuoteRecord]) -> Result<()> {
    write_collection(primary, records)?;
    if let Some(secondary) = secondary {
        mirror(records, secondary)?;
    }
    Ok(())
}

/// Content fully written to a temporary file beside its destination,
/// waiting to be renamed into place.
///
/// Dropping a `StagedWrite` without calling [`commit`](Self::commit)
/// deletes the temporary file; the destination is never touched.
pub struct StagedWrite<'a> {
    tmp: NamedTempFile,
    dest: &'a Path,
    dir: PathBuf,
}

impl<'a> StagedWrite<'a> {
    /// Create a uniquely named `.tmp_*` file in the destination directory
    /// and write `content` to it in full.
    pub fn stage(dest: &'a Path, content: &[u8]) -> Result<Self> {
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp_")
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(content)
            .with_context(|| format!("Failed to write temp file for {}", dest.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to sync temp file for {}", dest.display()))?;

        Ok(Self {
            tmp,
            dest,
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the staged temporary file.
    pub fn temp_path(&self) -> &Path {
        self.tmp.path()
    }

    /// Rename the staged file over the destination, then sync the
    /// directory so the rename itself is durable.
    pub fn commit(self) -> Result<()> {
        let Self { tmp, dest, dir } = self;
        tmp.persist(dest)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", dest.display()))?;
        sync_dir(&dir)
    }
}

/// Flush directory metadata (entry creation and renames) to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    std::fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .with_context(|| format!("Failed to sync directory {}", dir.display()))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
