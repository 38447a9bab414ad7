//! Walks through the three indexes and prints arena statistics as JSON.
//!
//! Usage: `strata-demo [config.json]`, where the optional file holds an
//! `IndexConfig` such as `{"domain": 5, "capacity": 64}`.

use anyhow::{ensure, Context, Result};
use std::fs;
use strata::{BinaryLifting, DynamicRangeIndex, GhostToken, IndexConfig, RollbackTree, TreePathIndex, VersionedIndex};

fn load_config() -> Result<IndexConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
        }
        None => Ok(IndexConfig::for_workload(5, 5)),
    }
}

fn main() -> Result<()> {
    let config = load_config()?;
    let domain = config.domain;
    ensure!(domain > 0, "the value domain must hold at least one position");

    GhostToken::new(|mut token| -> Result<()> {
        let mut index = VersionedIndex::with_config(config);
        let values: Vec<usize> = (1..=domain).collect();
        let last = index.build(&mut token, &values)?;
        let v0 = index.initial();
        let k = (domain + 1) / 2;
        println!("median of v0..v{}: {}", last.number(), index.range_kth(&token, v0, last, k)?);

        let mut slots = RollbackTree::from_bits(&mut token, domain, &vec![true; domain])?;
        let masked = slots.assign_head(&mut token, 1, k, false)?;
        println!("free slots after masking [1, {k}]: {}", slots.count_zeros(&token, masked, 1, domain)?);
        slots.rollback(&mut token, 1)?;
        println!("first occupied slot after rollback: {}", slots.kth_one(&token, slots.head(), 1)?);

        let mut array = DynamicRangeIndex::from_values(&mut token, domain, &values)?;
        array.set(&mut token, 1, domain)?;
        println!("largest of a[1..={domain}]: {}", array.range_kth_largest(&token, 1, domain, 1)?);

        let parents: Vec<Option<usize>> = (0..domain).map(|u| u.checked_sub(1)).collect();
        let oracle = BinaryLifting::new(&parents)?;
        let paths = TreePathIndex::build(&mut token, domain, oracle, &values)?;
        println!("nodes on path 0..{}: {}", domain - 1, paths.path_len(&token, 0, domain - 1)?);

        println!("{}", serde_json::to_string_pretty(&index.stats())?);
        Ok(())
    })
}
