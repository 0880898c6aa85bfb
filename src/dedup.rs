//! Collection deduplication.
//!
//! One pass over the collection in stored order: the first record with a
//! given fingerprint survives, later ones are dropped. Survivors get their
//! `hash` rewritten from their text, which also repairs hand-edited or
//! stale hashes. The file is only rewritten when something was dropped.

use anyhow::Result;
use std::collections::HashMap;
use tracing::info;

use crate::config::Config;
use crate::fingerprint::hash_field;
use crate::models::QuoteRecord;
use crate::store;

/// A dropped record and the index of the record it duplicates.
#[derive(Debug, Clone)]
pub struct Duplicate {
    pub record: QuoteRecord,
    pub kept_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub kept: Vec<QuoteRecord>,
    pub duplicates: Vec<Duplicate>,
}

/// Keep the first record per fingerprint, preserving relative order.
pub fn deduplicate(records: Vec<QuoteRecord>) -> DedupOutcome {
    let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut out = DedupOutcome::default();

    for mut record in records {
        let fp = record.fingerprint();
        if let Some(&kept_index) = first_seen.get(&fp) {
            out.duplicates.push(Duplicate { record, kept_index });
            continue;
        }

        first_seen.insert(fp.clone(), out.kept.len());
        record.hash = hash_field(&fp);
        out.kept.push(record);
    }

    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupSummary {
    pub before: usize,
    pub after: usize,
    pub removed: usize,
    pub written: bool,
}

/// Run `quotes dedup`.
pub fn run_dedup(config: &Config, dry_run: bool) -> Result<DedupSummary> {
    let data_file = &config.paths.data_file;
    let records = store::read_collection(data_file);
    let before = records.len();

    let outcome = deduplicate(records);
    for dup in &outcome.duplicates {
        let fp = dup.record.fingerprint();
        info!(
            kept_index = dup.kept_index,
            hash = &fp[..8],
            "duplicate found: \"{}...\"",
            preview(&dup.record.text_original, 50)
        );
    }

    let mut summary = DedupSummary {
        before,
        after: outcome.kept.len(),
        removed: outcome.duplicates.len(),
        written: false,
    };

    if dry_run {
        println!("dedup (dry-run)");
    } else {
        println!("dedup");
    }
    println!("  before: {}", summary.before);
    println!("  after: {}", summary.after);
    println!("  removed: {}", summary.removed);

    if summary.removed == 0 {
        println!("No duplicates found. Data is already clean.");
        return Ok(summary);
    }
    if dry_run {
        return Ok(summary);
    }

    store::publish(data_file, config.paths.mirror_path(), &outcome.kept)?;
    summary.written = true;
    println!("ok");
    Ok(summary)
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use tempfile::TempDir;

    fn record(id: &str, text: &str) -> QuoteRecord {
        QuoteRecord {
            id: id.to_string(),
            text_original: text.to_string(),
            author: None,
            source_name: Some("Seed".to_string()),
            source_url: None,
            language: "en".to_string(),
            tags: vec![],
            fetched_at: None,
            hash: String::new(),
            extra: Default::default(),
        }
    }

    #[test]
    fn drops_later_duplicates_and_rewrites_hash() {
        let input = vec![record("1", "A"), record("2", "a"), record("3", "B")];

        let out = deduplicate(input);

        assert_eq!(out.duplicates.len(), 1);
        assert_eq!(out.duplicates[0].record.id, "2");
        assert_eq!(out.duplicates[0].kept_index, 0);
        let kept: Vec<_> = out
            .kept
            .iter()
            .map(|r| (r.text_original.as_str(), r.hash.clone()))
            .collect();
        assert_eq!(
            kept,
            vec![
                ("A", format!("sha256:{}", fingerprint("A"))),
                ("B", format!("sha256:{}", fingerprint("B"))),
            ]
        );
    }

    #[test]
    fn whitespace_variants_are_duplicates() {
        let out = deduplicate(vec![
            record("1", "Hello   World\n"),
            record("2", "hello world"),
        ]);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.kept[0].id, "1");
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let input = vec![
            record("1", "A"),
            record("2", "B"),
            record("3", "a"),
            record("4", "C"),
            record("5", "b "),
        ];

        let first = deduplicate(input);
        assert_eq!(first.duplicates.len(), 2);
        let second = deduplicate(first.kept.clone());

        assert!(second.duplicates.is_empty());
        assert_eq!(second.kept, first.kept);
    }

    #[test]
    fn stale_hash_is_repaired() {
        let mut r = record("1", "Fresh text");
        r.hash = format!("sha256:{}", fingerprint("something else"));

        let out = deduplicate(vec![r]);

        assert_eq!(out.kept[0].hash, format!("sha256:{}", fingerprint("Fresh text")));
    }

    #[test]
    fn other_fields_are_untouched() {
        let mut r = record("1", "Keep me");
        r.author = Some("Someone".to_string());
        r.tags = vec!["x".to_string()];
        r.fetched_at = Some("2024-01-01T00:00:00.000Z".to_string());
        r.extra
            .insert("note".to_string(), serde_json::json!("hand-edited"));

        let out = deduplicate(vec![r.clone()]);

        let mut expected = r;
        expected.hash = format!("sha256:{}", fingerprint("Keep me"));
        assert_eq!(out.kept[0], expected);
    }

    fn config_in(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.paths.data_file = root.join("data").join("quotes.json");
        config.paths.mirror_file = Some(root.join("site").join("data").join("quotes.json"));
        config
    }

    #[test]
    fn run_rewrites_and_mirrors_when_duplicates_exist() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        store::write_collection(
            &config.paths.data_file,
            &[record("1", "A"), record("2", "a"), record("3", "B")],
        )
        .unwrap();

        let summary = run_dedup(&config, false).unwrap();

        assert_eq!(
            summary,
            DedupSummary {
                before: 3,
                after: 2,
                removed: 1,
                written: true
            }
        );
        assert_eq!(store::read_collection(&config.paths.data_file).len(), 2);
        assert_eq!(
            std::fs::read(&config.paths.data_file).unwrap(),
            std::fs::read(config.paths.mirror_file.as_ref().unwrap()).unwrap()
        );

        let again = run_dedup(&config, false).unwrap();
        assert_eq!(again.removed, 0);
        assert!(!again.written);
    }

    #[test]
    fn run_keeps_records_with_mistyped_fields() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        std::fs::create_dir_all(config.paths.data_file.parent().unwrap()).unwrap();
        std::fs::write(
            &config.paths.data_file,
            r#"[{"id":"1","text_original":"Kept A","hash":"sha256:00"},
                {"id":"2","text_original":"Other","language":null,"hash":null},
                {"id":"3","text_original":"kept   a","hash":"sha256:00"}]"#,
        )
        .unwrap();

        let summary = run_dedup(&config, false).unwrap();

        assert_eq!(summary.before, 3);
        assert_eq!(summary.after, 2);
        assert_eq!(summary.removed, 1);
        let stored = store::read_collection(&config.paths.data_file);
        let ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(stored[1].language, "en");
        assert_eq!(stored[1].hash, format!("sha256:{}", fingerprint("Other")));
    }

    #[test]
    fn clean_collection_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        // Stale hash on purpose: a clean pass must not rewrite even to fix it.
        let mut r = record("1", "A");
        r.hash = "sha256:stale".to_string();
        store::write_collection(&config.paths.data_file, &[r]).unwrap();
        let before = std::fs::read(&config.paths.data_file).unwrap();

        let summary = run_dedup(&config, false).unwrap();

        assert!(!summary.written);
        assert_eq!(std::fs::read(&config.paths.data_file).unwrap(), before);
        assert!(!config.paths.mirror_file.as_ref().unwrap().exists());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        store::write_collection(&config.paths.data_file, &[record("1", "A"), record("2", "A")])
            .unwrap();
        let before = std::fs::read(&config.paths.data_file).unwrap();

        let summary = run_dedup(&config, true).unwrap();

        assert_eq!(summary.removed, 1);
        assert!(!summary.written);
        assert_eq!(std::fs::read(&config.paths.data_file).unwrap(), before);
    }
}
