//! Bundled fallback quotes.
//!
//! The seed file is read at most once per [`SeedList`], on first use. A
//! missing or malformed file is an empty list, which simply means the seed
//! providers never yield.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::models::{CandidateQuote, SeedEntry};

pub struct SeedList {
    path: Option<PathBuf>,
    entries: OnceLock<Vec<SeedEntry>>,
}

impl SeedList {
    /// A seed list backed by a JSON file, loaded lazily.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: OnceLock::new(),
        }
    }

    /// A seed list with fixed entries.
    pub fn from_entries(entries: Vec<SeedEntry>) -> Self {
        Self {
            path: None,
            entries: OnceLock::from(entries),
        }
    }

    pub fn entries(&self) -> &[SeedEntry] {
        self.entries.get_or_init(|| match &self.path {
            Some(path) => load_seed_file(path),
            None => Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Select the seed at `index`, wrapping in both directions.
    ///
    /// Returns `None` for an empty list or an entry without usable text.
    pub fn select(&self, index: i64) -> Option<CandidateQuote> {
        let entries = self.entries();
        if entries.is_empty() {
            return None;
        }
        let idx = index.rem_euclid(entries.len() as i64) as usize;
        entries[idx].to_candidate()
    }
}

fn load_seed_file(path: &std::path::Path) -> Vec<SeedEntry> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "seed file unavailable");
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(path = %path.display(), "seed file is not a JSON array");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "seed file is not valid JSON");
            return Vec::new();
        }
    };

    // Only entries with a string body are kept; other fields are coerced.
    let mut seeds = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.get("text_original").is_some_and(Value::is_string) {
            debug!(index, "skipping seed without text");
            continue;
        }
        match serde_json::from_value::<SeedEntry>(entry) {
            Ok(seed) => seeds.push(seed),
            Err(e) => warn!(index, error = %e, "skipping unreadable seed entry"),
        }
    }
    debug!(path = %path.display(), count = seeds.len(), "loaded seeds");
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(text: &str) -> SeedEntry {
        SeedEntry {
            text_original: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn select_wraps_index() {
        let seeds = SeedList::from_entries(vec![seed("a"), seed("b"), seed("c")]);
        assert_eq!(seeds.select(0).unwrap().text_original, "a");
        assert_eq!(seeds.select(4).unwrap().text_original, "b");
        assert_eq!(seeds.select(-1).unwrap().text_original, "c");
        assert_eq!(seeds.select(-4).unwrap().text_original, "c");
    }

    #[test]
    fn select_from_empty_is_none() {
        let seeds = SeedList::from_entries(vec![]);
        assert!(seeds.select(0).is_none());
        assert!(seeds.select(-3).is_none());
    }

    #[test]
    fn select_blank_entry_is_none() {
        let seeds = SeedList::from_entries(vec![seed("a"), seed("  ")]);
        assert!(seeds.select(1).is_none());
    }

    #[test]
    fn loads_file_and_drops_entries_without_text() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seeds.json");
        std::fs::write(
            &path,
            r#"[{"text_original":"One","author":"A"},{"author":"B"},{"text_original":7},null]"#,
        )
        .unwrap();

        let seeds = SeedList::from_path(&path);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds.select(0).unwrap().author.as_deref(), Some("A"));
    }

    #[test]
    fn keeps_seeds_with_mistyped_optional_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seeds.json");
        std::fs::write(
            &path,
            r#"[{"text_original":"One","author":5,"tags":["a",1]},{"text_original":"Two","tags":"x"}]"#,
        )
        .unwrap();

        let seeds = SeedList::from_path(&path);
        assert_eq!(seeds.len(), 2);
        let first = seeds.select(0).unwrap();
        assert_eq!(first.author.as_deref(), Some("5"));
        assert_eq!(first.tags, vec!["a".to_string(), "1".to_string()]);
        assert!(seeds.select(1).unwrap().tags.is_empty());
    }

    #[test]
    fn loads_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seeds.json");
        std::fs::write(&path, r#"[{"text_original":"One"}]"#).unwrap();

        let seeds = SeedList::from_path(&path);
        assert_eq!(seeds.len(), 1);
        std::fs::write(&path, r#"[{"text_original":"One"},{"text_original":"Two"}]"#).unwrap();
        assert_eq!(seeds.len(), 1);
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let seeds = SeedList::from_path(tmp.path().join("absent.json"));
        assert!(seeds.is_empty());
    }
}
