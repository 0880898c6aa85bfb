//! Fetch-and-append orchestration.
//!
//! Coordinates one `quotes fetch` run: read collection → build the known
//! fingerprint set → acquire unique candidates slot by slot → append →
//! persist and mirror (skipped on dry-run).
//!
//! Every slot gets up to `max_retries` attempts. A candidate whose
//! fingerprint is already known is discarded and the slot retried; a slot
//! for which no provider yields anything is abandoned at once. Failing a
//! slot is never fatal, the run just appends fewer quotes than requested.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, RunOptions};
use crate::fingerprint::strip_hash_prefix;
use crate::models::{CandidateQuote, QuoteRecord};
use crate::provider::{ProviderChain, RemoteProvider};
use crate::seeds::SeedList;
use crate::store;

/// Result of acquiring candidates for a run.
#[derive(Debug, Default)]
pub struct Acquisition {
    /// Unique candidates, in acquisition order.
    pub accepted: Vec<CandidateQuote>,
    /// Slots that hit the retry ceiling.
    pub exhausted_slots: Vec<usize>,
    /// Slots abandoned because no provider yielded anything.
    pub empty_slots: Vec<usize>,
}

pub struct IngestEngine {
    chain: ProviderChain,
    max_retries: usize,
    /// Pause after a duplicate; `None` when offline.
    retry_delay: Option<Duration>,
}

impl IngestEngine {
    pub fn new(chain: ProviderChain, max_retries: usize, retry_delay: Option<Duration>) -> Self {
        Self {
            chain,
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    /// Build the engine for a run. Offline runs get no remote provider and
    /// no retry delay.
    pub fn from_config(config: &Config, opts: &RunOptions, seeds: Arc<SeedList>) -> Result<Self> {
        let (remote, delay) = if opts.offline {
            (None, None)
        } else {
            let remote = RemoteProvider::new(&config.remote.base_url, config.remote.timeout())?;
            (Some(remote), Some(config.remote.retry_delay()))
        };
        Ok(Self::new(
            ProviderChain::standard(remote, seeds),
            config.ingest.max_retries,
            delay,
        ))
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Acquire up to `count` candidates whose fingerprints are not in
    /// `known`. Accepted fingerprints are added to `known` as they are found.
    pub async fn acquire(&self, count: usize, known: &mut HashSet<String>) -> Acquisition {
        let mut out = Acquisition::default();

        for slot in 0..count {
            let mut attempt = 0;
            while attempt < self.max_retries {
                let Some((candidate, provider)) = self.chain.next_candidate(slot, attempt).await
                else {
                    warn!(slot, "no fallback quote available");
                    out.empty_slots.push(slot);
                    break;
                };

                let fp = candidate.fingerprint();
                if known.insert(fp.clone()) {
                    debug!(slot, provider, fingerprint = &fp[..8], "accepted candidate");
                    out.accepted.push(candidate);
                    break;
                }

                attempt += 1;
                info!(
                    slot,
                    provider,
                    "Retry {}/{}: duplicate found, fetching another",
                    attempt,
                    self.max_retries
                );
                if attempt < self.max_retries {
                    if let Some(delay) = self.retry_delay {
                        tokio::time::sleep(delay).await;
                    }
                }
            }

            if attempt >= self.max_retries {
                warn!(
                    slot,
                    "failed to find unique quote after {} retries", self.max_retries
                );
                out.exhausted_slots.push(slot);
            }
        }

        out
    }
}

/// Fingerprints already present in a collection.
///
/// Each record contributes the fingerprint recomputed from its text and,
/// if different, the hex of its stored `hash`.
pub fn known_fingerprints(records: &[QuoteRecord]) -> HashSet<String> {
    let mut known = HashSet::with_capacity(records.len());
    for record in records {
        known.insert(record.fingerprint());
        let stored = strip_hash_prefix(&record.hash);
        if !stored.is_empty() {
            known.insert(stored.to_string());
        }
    }
    known
}

/// Turn accepted candidates into records and append them in order.
pub fn append_records(
    records: &mut Vec<QuoteRecord>,
    accepted: Vec<CandidateQuote>,
    now: DateTime<Utc>,
) -> usize {
    let n = accepted.len();
    records.extend(accepted.into_iter().map(|c| c.into_record(now)));
    n
}

/// Outcome of a fetch run, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub requested: usize,
    pub before: usize,
    pub appended: usize,
    pub total: usize,
    pub written: bool,
}

/// Run `quotes fetch`.
pub async fn run_fetch(config: &Config, opts: &RunOptions) -> Result<FetchSummary> {
    let data_file = &config.paths.data_file;
    let mut records = store::read_collection(data_file);
    let before = records.len();
    let mut known = known_fingerprints(&records);

    let seeds = Arc::new(SeedList::from_path(&config.paths.seeds_file));
    let engine = IngestEngine::from_config(config, opts, seeds)?;
    debug!(chain = ?engine.chain().names(), "provider chain");

    let acquisition = engine.acquire(opts.count, &mut known).await;
    let appended = append_records(&mut records, acquisition.accepted, Utc::now());

    let mut summary = FetchSummary {
        requested: opts.count,
        before,
        appended,
        total: records.len(),
        written: false,
    };

    if opts.dry_run {
        println!("fetch (dry-run)");
    } else {
        println!("fetch");
    }
    println!("  requested: {}", summary.requested);
    println!("  before: {}", summary.before);

    if appended == 0 {
        println!("  appended: 0");
        println!("No new quotes appended.");
        return Ok(summary);
    }

    if opts.dry_run {
        println!("  would append: {}", appended);
        println!("  total would be: {}", summary.total);
        return Ok(summary);
    }

    store::publish(data_file, config.paths.mirror_path(), &records)?;
    summary.written = true;

    println!("  appended: {}", appended);
    println!("  total: {}", summary.total);
    println!("ok");
    Ok(summary)
}
