//! Fixtures for the integration tests, plus optional log capture.
//!
//! The library emits events only with `--features tracing`. Call
//! [`init_tracing`] at the top of a test to see promotions, slot reuse and
//! rollbacks:
//!
//! ```bash
//! RUST_LOG=sortition=debug cargo test --features tracing --test draw_tests
//! ```
//!
//! `RUST_LOG` filters (default `warn`). Events also go to
//! `$SORTITION_LOG_DIR/sortition.jsonl` (default `logs/`) as NDJSON when
//! that directory can be created. `SORTITION_LOG_CONSOLE=0` keeps the
//! terminal quiet.

#![allow(dead_code)]

use std::env;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use sortition::{Key, SortitionTree, U256};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

static INIT: Once = Once::new();

/// Install the subscriber; later calls in the same test binary do nothing.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        let console = env::var("SORTITION_LOG_CONSOLE")
            .map_or(true, |v| v != "0")
            .then(|| {
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_filter(filter())
            });

        let dir = env::var("SORTITION_LOG_DIR").map_or_else(|_| PathBuf::from("logs"), PathBuf::from);
        let ndjson = fs::create_dir_all(&dir)
            .and_then(|()| File::options().create(true).append(true).open(dir.join("sortition.jsonl")))
            .ok()
            .map(|file| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_line_number(true)
                    .with_filter(filter())
            });

        let _ = Registry::default().with(console).with(ndjson).try_init();
    });
}

// ============================================================================
//  Fixtures
// ============================================================================

pub fn w(value: u64) -> U256 {
    U256::from(value)
}

pub fn key(id: u64) -> Key {
    Key::from(id)
}

/// Tree with branching `k` and keys `1..=n` weighted by `weight(i)`.
pub fn tree_with(k: usize, n: u64, weight: impl Fn(u64) -> u64) -> SortitionTree {
    let mut tree = SortitionTree::with_branching(k).unwrap();
    for i in 1..=n {
        tree.set(key(i), w(weight(i))).unwrap();
    }
    tree
}

/// Count how many selectors in `[0, total)` land on each active key.
///
/// Only sensible for small totals.
pub fn selector_counts(tree: &SortitionTree) -> std::collections::HashMap<Key, u64> {
    let total = tree.total_weight().low_u64();
    let mut counts = std::collections::HashMap::new();
    for s in 0..total {
        *counts.entry(tree.draw(w(s)).unwrap()).or_insert(0) += 1;
    }
    counts
}
