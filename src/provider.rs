//! Quote providers and the fallback chain.
//!
//! A [`QuoteProvider`] produces at most one [`CandidateQuote`] per call and
//! never fails: every problem is logged and reported as `None`. The
//! [`ProviderChain`] tries its providers in order until one yields.
//!
//! ```text
//! online:   remote ──▶ seed ──▶ random seed
//! offline:             seed ──▶ random seed
//! ```

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{CandidateQuote, DEFAULT_LANGUAGE};
use crate::seeds::SeedList;

/// A source of candidate quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short label used in logs and `quotes sources`.
    fn name(&self) -> &str;

    /// Produce one candidate for `slot`, on retry number `attempt`.
    ///
    /// Absence is the only failure signal.
    async fn candidate(&self, slot: usize, attempt: usize) -> Option<CandidateQuote>;
}

// ============ Remote Provider ============

/// Why a remote lookup produced nothing. Never leaves this module.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}

/// Fetches random quotes from a Quotable-compatible HTTP API.
///
/// Tries `GET {base}/quotes/random?limit=1` (one-item array) first and
/// falls back to the legacy `GET {base}/random` (single object).
pub struct RemoteProvider {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.json::<Value>().await?)
    }

    async fn fetch_listing(&self) -> Result<CandidateQuote, FetchError> {
        let url = format!("{}/quotes/random?limit=1", self.base_url);
        let json = self.get_json(&url).await?;
        parse_listing(&json, &self.base_url)
    }

    async fn fetch_legacy(&self) -> Result<CandidateQuote, FetchError> {
        let url = format!("{}/random", self.base_url);
        let json = self.get_json(&url).await?;
        parse_single(&json, &self.base_url)
    }
}

#[async_trait]
impl QuoteProvider for RemoteProvider {
    fn name(&self) -> &str {
        "remote"
    }

    async fn candidate(&self, _slot: usize, _attempt: usize) -> Option<CandidateQuote> {
        match self.fetch_listing().await {
            Ok(quote) => return Some(quote),
            Err(e) => debug!(error = %e, "random listing endpoint failed, trying legacy"),
        }
        match self.fetch_legacy().await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(error = %e, base_url = %self.base_url, "remote quote fetch failed");
                None
            }
        }
    }
}

/// Parse the `/quotes/random` response: an array whose first item is a quote.
pub fn parse_listing(json: &Value, base_url: &str) -> Result<CandidateQuote, FetchError> {
    let item = json
        .as_array()
        .and_then(|items| items.first())
        .ok_or(FetchError::Shape("expected a non-empty array"))?;
    parse_single(item, base_url)
}

/// Parse a single quote object (`content`, `author`, `tags`, `_id`).
pub fn parse_single(item: &Value, base_url: &str) -> Result<CandidateQuote, FetchError> {
    let content = item
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(FetchError::Shape("missing content"))?;

    let author = item
        .get("author")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let tags = item
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let id = item.get("_id").and_then(Value::as_str).unwrap_or_default();

    Ok(CandidateQuote {
        text_original: content.to_string(),
        author,
        source_name: Some("Quotable".to_string()),
        source_url: Some(format!("{}/quotes/{}", base_url.trim_end_matches('/'), id)),
        language: DEFAULT_LANGUAGE.to_string(),
        tags,
    })
}

// ============ Seed Providers ============

/// Walks the seed list deterministically: slot `i`, attempt `r` picks
/// seed `i + r` (wrapping).
pub struct SeedProvider {
    seeds: Arc<SeedList>,
}

impl SeedProvider {
    pub fn new(seeds: Arc<SeedList>) -> Self {
        Self { seeds }
    }
}

#[async_trait]
impl QuoteProvider for SeedProvider {
    fn name(&self) -> &str {
        "seed"
    }

    async fn candidate(&self, slot: usize, attempt: usize) -> Option<CandidateQuote> {
        self.seeds.select((slot + attempt) as i64)
    }
}

/// Last resort: a uniformly random seed.
pub struct RandomSeedProvider {
    seeds: Arc<SeedList>,
}

impl RandomSeedProvider {
    pub fn new(seeds: Arc<SeedList>) -> Self {
        Self { seeds }
    }
}

#[async_trait]
impl QuoteProvider for RandomSeedProvider {
    fn name(&self) -> &str {
        "random-seed"
    }

    async fn candidate(&self, _slot: usize, _attempt: usize) -> Option<CandidateQuote> {
        let len = self.seeds.len();
        if len == 0 {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..len) as i64;
        self.seeds.select(index)
    }
}

// ============ Chain ============

/// An ordered list of providers tried until one yields a candidate.
pub struct ProviderChain {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn QuoteProvider>>) -> Self {
        Self { providers }
    }

    /// The standard chain. `remote` is `None` in offline mode.
    pub fn standard(remote: Option<RemoteProvider>, seeds: Arc<SeedList>) -> Self {
        let mut providers: Vec<Box<dyn QuoteProvider>> = Vec::new();
        if let Some(remote) = remote {
            providers.push(Box::new(remote));
        }
        providers.push(Box::new(SeedProvider::new(seeds.clone())));
        providers.push(Box::new(RandomSeedProvider::new(seeds)));
        Self { providers }
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Ask each provider in turn; returns the first candidate and the name
    /// of the provider that produced it.
    pub async fn next_candidate(
        &self,
        slot: usize,
        attempt: usize,
    ) -> Option<(CandidateQuote, &str)> {
        for provider in &self.providers {
            if let Some(candidate) = provider.candidate(slot, attempt).await {
                return Some((candidate, provider.name()));
            }
            debug!(provider = provider.name(), slot, attempt, "provider yielded nothing");
        }
        None
    }
}
