//! Core data models used throughout quote-keeper.
//!
//! [`CandidateQuote`] is what a provider hands back; [`QuoteRecord`] is what
//! lands in `quotes.json` once its fingerprint has been confirmed unique.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fingerprint::{fingerprint, hash_field};

/// Language recorded when a source does not say.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Raw quote produced by a provider before it is assigned an id, a
/// timestamp, and a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuote {
    pub text_original: String,
    pub author: Option<String>,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub language: String,
    pub tags: Vec<String>,
}

impl CandidateQuote {
    /// Fingerprint of the quote body.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.text_original)
    }

    /// Promote this candidate into a persisted record.
    ///
    /// The id is `<date>_<first 10 hex chars of the fingerprint>`, which is
    /// unique as long as the collection holds no duplicate fingerprints.
    pub fn into_record(self, fetched_at: DateTime<Utc>) -> QuoteRecord {
        let fp = self.fingerprint();
        let id = format!("{}_{}", fetched_at.format("%Y-%m-%d"), &fp[..10]);

        QuoteRecord {
            id,
            text_original: self.text_original,
            author: self.author,
            source_name: self.source_name,
            source_url: self.source_url,
            language: self.language,
            tags: self.tags,
            fetched_at: Some(fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            hash: hash_field(&fp),
            extra: Map::new(),
        }
    }
}

/// A quote as stored in the collection file.
///
/// Field order here is the field order on disk. Fields this crate does not
/// know about are carried through `extra` untouched. Known fields are read
/// leniently: a hand-edited `null` or mistyped value falls back to the
/// field's default rather than rejecting the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text_original: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source_url: Option<String>,
    #[serde(default = "default_language", deserialize_with = "lenient::language")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fetched_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl QuoteRecord {
    /// Fingerprint recomputed from `text_original`, ignoring the stored hash.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.text_original)
    }

    /// Fill in a missing `hash` from the text. Well-formed hashes are left
    /// for the dedup pass to verify.
    pub fn repair_hash(&mut self) -> bool {
        if self.hash.is_empty() {
            self.hash = hash_field(&self.fingerprint());
            return true;
        }
        false
    }
}

/// Shape of one entry in `seeds.json`.
///
/// Everything is optional so that a malformed entry can be reported as
/// absent instead of failing the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub text_original: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
}

impl SeedEntry {
    /// Convert to a candidate, or `None` if the entry has no usable text.
    pub fn to_candidate(&self) -> Option<CandidateQuote> {
        let text = self.text_original.as_deref()?;
        if text.trim().is_empty() {
            return None;
        }

        Some(CandidateQuote {
            text_original: text.to_string(),
            author: self.author.clone(),
            source_name: Some(
                self.source_name
                    .clone()
                    .unwrap_or_else(|| "Seed".to_string()),
            ),
            source_url: self.source_url.clone(),
            language: self
                .language
                .clone()
                .unwrap_or_else(default_language),
            tags: self.tags.clone(),
        })
    }
}

/// Deserializers that accept any JSON value for a field.
///
/// Strings pass through, numbers and booleans are rendered as text, and
/// anything else (`null`, arrays, objects) becomes the field's default.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(d)?))
    }

    pub fn language<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(d)?)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(super::default_language))
    }

    pub fn tags<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Array(items) => Ok(items.into_iter().filter_map(scalar).collect()),
            _ => Ok(Vec::new()),
        }
    }
}
