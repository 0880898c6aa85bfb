use anyhow::Result;

use crate::config::{Config, RunOptions};
use crate::seeds::SeedList;
use crate::store;

/// One row of `quotes sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: String,
    pub status: String,
    pub healthy: bool,
}

/// Status of every provider in the fallback chain, in chain order, plus
/// the collection file.
pub fn get_sources(config: &Config, opts: &RunOptions) -> Vec<SourceStatus> {
    let mut rows = Vec::new();

    if opts.offline {
        rows.push(SourceStatus {
            name: "remote".to_string(),
            status: "DISABLED (offline)".to_string(),
            healthy: false,
        });
    } else {
        rows.push(SourceStatus {
            name: "remote".to_string(),
            status: config.remote.base_url.clone(),
            healthy: true,
        });
    }

    let seeds = SeedList::from_path(&config.paths.seeds_file);
    let (seed_status, seed_ok) = if config.paths.seeds_file.exists() {
        if seeds.is_empty() {
            ("EMPTY".to_string(), false)
        } else {
            (format!("OK ({} seeds)", seeds.len()), true)
        }
    } else {
        ("NOT FOUND".to_string(), false)
    };
    for name in ["seed", "random-seed"] {
        rows.push(SourceStatus {
            name: name.to_string(),
            status: seed_status.clone(),
            healthy: seed_ok,
        });
    }

    let data_file = &config.paths.data_file;
    let (status, healthy) = if data_file.exists() {
        let n = store::read_collection(data_file).len();
        (format!("OK ({} quotes)", n), true)
    } else {
        ("NOT CREATED".to_string(), true)
    };
    rows.push(SourceStatus {
        name: "collection".to_string(),
        status,
        healthy,
    });

    rows
}

pub fn list_sources(config: &Config, opts: &RunOptions) -> Result<()> {
    println!("{:<14} {:<36} HEALTHY", "SOURCE", "STATUS");
    for row in get_sources(config, opts) {
        println!("{:<14} {:<36} {}", row.name, row.status, row.healthy);
    }
    Ok(())
}
