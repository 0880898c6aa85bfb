//! # quote-keeper
//!
//! Maintains a deduplicated, append-only collection of quotes stored as a
//! JSON array, fed from a remote quote API with a local seed fallback.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Providers   │──▶│   Ingest     │──▶│    Store     │──▶ mirror
//! │ remote/seeds │   │ unique slots │   │ atomic JSON  │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!                                        ┌─────┴──────┐
//!                                        │   Dedup    │
//!                                        └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! quotes fetch --count 3        # append three new quotes
//! OFFLINE_MODE=1 quotes fetch   # seeds only, no network
//! quotes dedup                  # drop duplicate entries
//! quotes sources                # show the provider chain
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML config + environment resolution |
//! | [`models`] | Candidate and record types |
//! | [`fingerprint`] | Text normalization and SHA-256 fingerprints |
//! | [`store`] | Atomic JSON read/write and mirroring |
//! | [`seeds`] | Lazily loaded seed list |
//! | [`provider`] | Remote/seed providers and the fallback chain |
//! | [`ingest`] | Fetch-and-append run |
//! | [`dedup`] | Deduplication pass |
//! | [`sources`] | Provider status listing |

pub mod config;
pub mod dedup;
pub mod fingerprint;
pub mod ingest;
pub mod models;
pub mod provider;
pub mod seeds;
pub mod sources;
pub mod store;
