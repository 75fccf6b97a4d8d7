//! Draw simulation for `SortitionTree`.
//!
//! Fills a tree with `entries` keys weighted `1..=entries`, draws `rounds`
//! seeded selectors with replacement and prints observed versus expected
//! frequencies, then drains the tree by drawing without replacement.
//!
//! Run with:
//! ```bash
//! cargo run --release -- [entries] [k] [rounds]
//! cargo run --release -- 16 4 200000
//! ```

#![allow(clippy::cast_precision_loss)]

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use sortition::{Key, SortitionError, SortitionTree, U256};

struct Args {
    entries: u64,
    k: usize,
    rounds: u64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut next = |name: &str, default: u64| -> Result<u64, String> {
        args.next().map_or(Ok(default), |raw| {
            raw.parse()
                .map_err(|_| format!("{name} must be a non-negative integer, got {raw:?}"))
        })
    };

    let entries = next("entries", 10)?;
    let k = usize::try_from(next("k", 2)?).map_err(|e| e.to_string())?;
    let rounds = next("rounds", 100_000)?;
    Ok(Args { entries, k, rounds })
}

fn run(args: &Args) -> Result<(), SortitionError> {
    let mut tree = SortitionTree::with_branching(args.k)?;
    for i in 1..=args.entries {
        tree.set(Key::from(i), U256::from(i))?;
    }

    let total = tree.total_weight().low_u64();
    println!(
        "entries={} k={} slots={} total={}",
        args.entries,
        args.k,
        tree.slot_count(),
        total
    );

    let start = Instant::now();
    let mut hits = vec![0u64; usize::try_from(args.entries).unwrap_or(0) + 1];
    for seed in 0..args.rounds {
        let winner = tree.draw_seeded(U256::from(seed))?;
        let id = usize::try_from(u64::from_be_bytes(
            winner.as_bytes()[24..].try_into().unwrap_or_default(),
        ))
        .unwrap_or(0);
        if let Some(slot) = hits.get_mut(id) {
            *slot += 1;
        }
    }
    let elapsed = start.elapsed();

    println!("{:>8} {:>10} {:>10}", "key", "observed", "expected");
    for (id, &count) in hits.iter().enumerate().skip(1) {
        let observed = count as f64 / args.rounds.max(1) as f64;
        let expected = id as f64 / total.max(1) as f64;
        println!("{id:>8} {observed:>10.4} {expected:>10.4}");
    }
    println!(
        "{} draws in {:?} ({:.0} ns/draw)",
        args.rounds,
        elapsed,
        elapsed.as_nanos() as f64 / args.rounds.max(1) as f64
    );

    let mut order = Vec::new();
    let mut seed = 0u64;
    while !tree.is_empty() {
        let winner = tree.draw_seeded(U256::from(seed))?;
        tree.remove(&winner)?;
        order.push(winner);
        seed += 1;
    }
    println!("drained {} keys; vacant slots = {}", order.len(), tree.vacant_slots());
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!("usage: sortition [entries] [k] [rounds]");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
